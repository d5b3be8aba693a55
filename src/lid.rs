//! PDS4 logical identifier parsing

use crate::error::{Result, SisError};
use std::fmt;

/// Required prefix of every PDS4 logical identifier
const LID_PREFIX: &str = "urn:nasa:pds";

/// A PDS4 logical identifier.
///
/// Colon-delimited archive-unique product name of the form
/// `urn:nasa:pds:<bundle>:<collection>:<product_id>`. Fields are
/// positional views on the raw string; no case folding or whitespace
/// normalization is performed at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lid {
    raw: String,
}

impl Lid {
    /// Parse a raw identifier string.
    ///
    /// # Returns
    /// * `Ok(Lid)` if the string starts with `urn:nasa:pds`
    /// * `Err(SisError::InvalidIdentifier)` otherwise
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with(LID_PREFIX) {
            return Err(SisError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Lid {
            raw: raw.to_string(),
        })
    }

    /// The raw identifier string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Survey namespace, e.g. `gbo.ast.catalina.survey`
    pub fn bundle(&self) -> &str {
        self.field(3)
    }

    /// Sub-archive, e.g. `data_calibrated`
    pub fn collection(&self) -> &str {
        self.field(4)
    }

    /// Per-survey encoded product name
    pub fn product_id(&self) -> &str {
        self.field(5)
    }

    /// Colon-split field at `index`, or the empty string when the
    /// identifier is too short. Short identifiers are rejected by the
    /// per-survey parsers, which own the grammar.
    fn field(&self, index: usize) -> &str {
        self.raw.split(':').nth(index).unwrap_or("")
    }
}

impl fmt::Display for Lid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
