//! Service configuration
//!
//! The service runs one invocation per request on a serverless
//! platform, so configuration comes from the environment. It is read
//! once into an explicit value and threaded into the pure resolver,
//! never consulted ad hoc from global state.

use crate::error::{Result, SisError};
use crate::resolver::ResolverConfig;
use std::env;

/// Environment variable naming the cache bucket
pub const CACHE_BUCKET_VAR: &str = "SIS_CACHE_BUCKET";

/// Environment variable holding the Catalina Sky Survey endpoint
/// cutover date (`YYYYMMDD`)
pub const CSS_DATE_LIMIT_VAR: &str = "S3_CSS_DATE_LIMIT";

/// Deployment configuration for the cutout service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Object-store bucket used for the cutout cache. Required for
    /// serving; its absence is a deployment defect reported per
    /// request.
    pub cache_bucket: Option<String>,

    /// Catalina Sky Survey endpoint cutover date. Unset means every
    /// product resolves to the legacy archive.
    pub css_date_limit: Option<String>,
}

impl ServiceConfig {
    /// Create a configuration with an explicit cache bucket
    pub fn new(cache_bucket: impl Into<String>) -> Self {
        ServiceConfig {
            cache_bucket: Some(cache_bucket.into()),
            css_date_limit: None,
        }
    }

    /// Load configuration from the environment.
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` - validated configuration; the bucket may
    ///   still be absent, which surfaces per request
    /// * `Err(SisError::ConfigError)` if a present value is invalid
    pub fn from_env() -> Result<Self> {
        let config = ServiceConfig {
            cache_bucket: env::var(CACHE_BUCKET_VAR).ok().filter(|v| !v.is_empty()),
            css_date_limit: env::var(CSS_DATE_LIMIT_VAR).ok().filter(|v| !v.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// - the CSS date limit, when set, must be exactly eight ASCII
    ///   digits (`YYYYMMDD`)
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = &self.css_date_limit {
            if limit.len() != 8 || !limit.bytes().all(|b| b.is_ascii_digit()) {
                return Err(SisError::ConfigError(format!(
                    "{} must be an 8-digit YYYYMMDD date, got '{}'",
                    CSS_DATE_LIMIT_VAR, limit
                )));
            }
        }
        Ok(())
    }

    /// The cache bucket, or a configuration error when it is absent
    pub fn require_cache_bucket(&self) -> Result<&str> {
        self.cache_bucket.as_deref().ok_or_else(|| {
            SisError::ConfigError(format!("{} is not configured", CACHE_BUCKET_VAR))
        })
    }

    /// Projection used by the URL resolver
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            css_date_limit: self.css_date_limit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_bucket() {
        let config = ServiceConfig::default();
        assert!(config.require_cache_bucket().is_err());
    }

    #[test]
    fn test_new_sets_bucket() {
        let config = ServiceConfig::new("cutout-cache");
        assert_eq!(config.require_cache_bucket().unwrap(), "cutout-cache");
    }

    #[test]
    fn test_validate_rejects_bad_date_limit() {
        let config = ServiceConfig {
            cache_bucket: Some("cutout-cache".to_string()),
            css_date_limit: Some("2023-05-26".to_string()),
        };
        assert!(matches!(config.validate(), Err(SisError::ConfigError(_))));
    }

    #[test]
    fn test_validate_accepts_eight_digit_limit() {
        let config = ServiceConfig {
            cache_bucket: Some("cutout-cache".to_string()),
            css_date_limit: Some("20230526".to_string()),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolver_config_projection() {
        let mut config = ServiceConfig::new("cutout-cache");
        config.css_date_limit = Some("20230526".to_string());
        assert_eq!(
            config.resolver_config().css_date_limit.as_deref(),
            Some("20230526")
        );
    }
}
