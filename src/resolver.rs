//! Survey-specific resolution of logical identifiers to archive URLs
//!
//! Each supported survey encodes observation metadata into its product
//! ids with its own, historically-grown grammar. Resolution is a pure
//! function of the identifier and the resolver configuration: no
//! network access, no caching, deterministic output.

use crate::error::{Result, SisError};
use crate::lid::Lid;

/// Base URL of the legacy SBN HTTP archive
const SBN_ARCHIVE_BASE: &str = "https://sbnarchive.psi.edu/pds4/surveys";

/// Base URL of the Catalina Sky Survey object-storage mirror
const CSS_S3_BASE: &str = "https://pds-css-archive.s3.us-west-2.amazonaws.com/sbn";

/// LONEOS archive software version cutover. Products dated before this
/// live under the beta pipeline directory, later ones under the
/// released pipeline. The original archive only brackets the boundary
/// (041226 is beta, 051113 is not); any date in the gap is equivalent.
const LONEOS_VERSION_CUTOVER: &str = "050101";

/// Configuration threaded into URL resolution.
///
/// Kept separate from the service configuration so that `resolve` stays
/// a pure function of its arguments.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Catalina Sky Survey endpoint cutover (`YYYYMMDD`). Products
    /// dated on or before this limit resolve to the object-storage
    /// mirror; later products, or all products when unset, resolve to
    /// the legacy archive.
    pub css_date_limit: Option<String>,
}

/// The closed set of survey resolution rules.
///
/// First-level dispatch keys on the LID bundle; the NEAT composite
/// survey additionally dispatches on the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyRule {
    Catalina,
    Spacewatch,
    NeatGeodss,
    NeatTricam,
    Loneos,
}

impl SurveyRule {
    /// Select the resolution rule for an identifier.
    ///
    /// # Returns
    /// * `Ok(SurveyRule)` for a registered bundle (and, for NEAT,
    ///   collection)
    /// * `Err(SisError::UnsupportedSurvey)` otherwise
    pub fn for_lid(lid: &Lid) -> Result<Self> {
        match lid.bundle() {
            "gbo.ast.catalina.survey" => Ok(SurveyRule::Catalina),
            "gbo.ast.spacewatch.survey" => Ok(SurveyRule::Spacewatch),
            "gbo.ast.neat.survey" => match lid.collection() {
                "data_geodss" => Ok(SurveyRule::NeatGeodss),
                "data_tricam" => Ok(SurveyRule::NeatTricam),
                other => Err(SisError::UnsupportedSurvey(format!(
                    "gbo.ast.neat.survey:{}",
                    other
                ))),
            },
            "gbo.ast.loneos.survey" => Ok(SurveyRule::Loneos),
            other => Err(SisError::UnsupportedSurvey(other.to_string())),
        }
    }
}

/// Resolve a logical identifier to a fully-qualified archive URL.
pub fn resolve(lid: &Lid, config: &ResolverConfig) -> Result<String> {
    match SurveyRule::for_lid(lid)? {
        SurveyRule::Catalina => resolve_catalina(lid, config),
        SurveyRule::Spacewatch => resolve_spacewatch(lid),
        SurveyRule::NeatGeodss | SurveyRule::NeatTricam => resolve_neat(lid),
        SurveyRule::Loneos => resolve_loneos(lid),
    }
}

fn malformed(lid: &Lid, survey: &str) -> SisError {
    SisError::MalformedProductId {
        survey: survey.to_string(),
        product_id: lid.product_id().to_string(),
    }
}

/// Catalina Sky Survey.
///
/// `g96_20210402_2b_f5q9m2_01_0001.arch` resolves to
/// `{base}/gbo.ast.catalina.survey/data_calibrated/G96/2021/21Apr02/G96_20210402_2B_F5Q9M2_01_0001.arch.fz`.
/// Products dated on or before the configured date limit target the
/// object-storage mirror instead of the legacy archive.
fn resolve_catalina(lid: &Lid, config: &ResolverConfig) -> Result<String> {
    let product_id = lid.product_id();
    let dot = product_id
        .find('.')
        .ok_or_else(|| malformed(lid, "Catalina Sky Survey"))?;
    let basename = product_id[..dot].to_uppercase();

    let mut tokens = basename.split('_');
    let telescope = tokens.next().ok_or_else(|| malformed(lid, "Catalina Sky Survey"))?;
    let date = tokens.next().ok_or_else(|| malformed(lid, "Catalina Sky Survey"))?;
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(lid, "Catalina Sky Survey"));
    }

    let month = month_abbrev(&date[4..6]).ok_or_else(|| malformed(lid, "Catalina Sky Survey"))?;
    let yy_mon_dd = format!("{}{}{}", &date[2..4], month, &date[6..8]);

    let base = match &config.css_date_limit {
        Some(limit) if date <= limit.as_str() => CSS_S3_BASE,
        _ => SBN_ARCHIVE_BASE,
    };

    Ok(format!(
        "{}/gbo.ast.catalina.survey/{}/{}/{}/{}/{}.arch.fz",
        base,
        lid.collection(),
        telescope,
        &date[..4],
        yy_mon_dd,
        basename
    ))
}

/// Spacewatch.
///
/// `sw_0993_09.01_2003_03_23_09_18_47.001.fits` resolves to
/// `{base}/gbo.ast.spacewatch.survey/data/2003/03/23/sw_0993_...fits`:
/// year, month, and day are underscore tokens 4-6 and the full product
/// id is used verbatim as the file name.
fn resolve_spacewatch(lid: &Lid) -> Result<String> {
    let product_id = lid.product_id();
    let tokens: Vec<&str> = product_id.split('_').collect();
    if tokens.len() < 6 {
        return Err(malformed(lid, "Spacewatch"));
    }

    Ok(format!(
        "{}/gbo.ast.spacewatch.survey/data/{}/{}/{}/{}",
        SBN_ARCHIVE_BASE, tokens[3], tokens[4], tokens[5], product_id
    ))
}

/// NEAT (GEODSS and Tricam collections).
///
/// `g19960417_obsdata_960417070119d` resolves to
/// `{base}/gbo.ast.neat.survey/data_geodss/g19960417/obsdata/960417070119d.fit.fz`:
/// all but the last underscore token become path segments, the last
/// token is the file basename.
fn resolve_neat(lid: &Lid) -> Result<String> {
    let product_id = lid.product_id();
    let (directory, basename) = product_id
        .rsplit_once('_')
        .ok_or_else(|| malformed(lid, "NEAT"))?;
    let directory = directory.replace('_', "/");

    Ok(format!(
        "{}/gbo.ast.neat.survey/{}/{}/{}.fit.fz",
        SBN_ARCHIVE_BASE,
        lid.collection(),
        directory,
        basename
    ))
}

/// LONEOS.
///
/// `041226_2a_082_fits` resolves to
/// `{base}/gbo.ast.loneos.survey/data_augmented/lois_3_2_0_beta/041226/041226_2a_082.fits`:
/// the archive software version directory depends on the embedded
/// 6-digit observation date, and the trailing `_fits` token is
/// rewritten as the `.fits` extension.
fn resolve_loneos(lid: &Lid) -> Result<String> {
    let product_id = lid.product_id();
    let basename = product_id
        .strip_suffix("_fits")
        .ok_or_else(|| malformed(lid, "LONEOS"))?;

    let date = basename.split('_').next().unwrap_or("");
    if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(lid, "LONEOS"));
    }

    let version = if date < LONEOS_VERSION_CUTOVER {
        "lois_3_2_0_beta"
    } else {
        "lois_4_2_0"
    };

    Ok(format!(
        "{}/gbo.ast.loneos.survey/data_augmented/{}/{}/{}.fits",
        SBN_ARCHIVE_BASE, version, date, basename
    ))
}

/// Numeric month to the archive's 3-letter abbreviation
fn month_abbrev(mm: &str) -> Option<&'static str> {
    match mm {
        "01" => Some("Jan"),
        "02" => Some("Feb"),
        "03" => Some("Mar"),
        "04" => Some("Apr"),
        "05" => Some("May"),
        "06" => Some("Jun"),
        "07" => Some("Jul"),
        "08" => Some("Aug"),
        "09" => Some("Sep"),
        "10" => Some("Oct"),
        "11" => Some("Nov"),
        "12" => Some("Dec"),
        _ => None,
    }
}
