//! Output format negotiation

use crate::error::{Result, SisError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoder quality for lossy output formats. Fixed; not
/// client-configurable.
pub const JPEG_QUALITY: u8 = 95;

/// The supported cutout output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Fits,
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Negotiate the output format from an optional raw query value.
    ///
    /// Input is lower-cased before matching; an absent value defaults
    /// to FITS, the archive-native format.
    ///
    /// # Returns
    /// * `Ok(ImageFormat)` for `fits`, `jpeg` (or `jpg`), or `png`
    /// * `Err(SisError::UnsupportedFormat)` otherwise
    pub fn negotiate(raw: Option<&str>) -> Result<Self> {
        let raw = match raw {
            None => return Ok(ImageFormat::Fits),
            Some(value) => value,
        };
        match raw.to_lowercase().as_str() {
            "fits" => Ok(ImageFormat::Fits),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            other => Err(SisError::UnsupportedFormat(other.to_string())),
        }
    }

    /// MIME type reported on responses in this format
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Fits => "image/fits",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Cache file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Fits => "fits",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }

    /// Whether this is the archive-native format, which skips raster
    /// encoding entirely
    pub fn is_native(&self) -> bool {
        matches!(self, ImageFormat::Fits)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_defaults_to_fits() {
        assert_eq!(ImageFormat::negotiate(None).unwrap(), ImageFormat::Fits);
    }

    #[test]
    fn test_negotiate_is_case_insensitive() {
        assert_eq!(
            ImageFormat::negotiate(Some("PNG")).unwrap(),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::negotiate(Some("Jpeg")).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_negotiate_accepts_jpg_alias() {
        assert_eq!(
            ImageFormat::negotiate(Some("jpg")).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_negotiate_rejects_unknown_format() {
        let result = ImageFormat::negotiate(Some("tiff"));
        assert!(matches!(&result, Err(SisError::UnsupportedFormat(_))));
        assert!(result.unwrap_err().is_client_error());
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(ImageFormat::Fits.content_type(), "image/fits");
        assert_eq!(ImageFormat::Jpeg.content_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.content_type(), "image/png");
    }

    #[test]
    fn test_only_fits_is_native() {
        assert!(ImageFormat::Fits.is_native());
        assert!(!ImageFormat::Jpeg.is_native());
        assert!(!ImageFormat::Png.is_native());
    }
}
