//! Request and response models for the gateway boundary

use crate::error::{Result, SisError};
use crate::format::ImageFormat;
use crate::lid::Lid;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Smallest accepted cutout size, in arcseconds
pub const MIN_SIZE_ARCSEC: f64 = 1.0;

/// Largest accepted cutout size, in arcseconds (15 arcminutes)
pub const MAX_SIZE_ARCSEC: f64 = 15.0 * 60.0;

/// The inbound request as handed over by the HTTP gateway.
///
/// Query parameters keep their received order; cache keys depend on it.
#[derive(Debug, Clone, Default)]
pub struct GatewayRequest {
    /// Request path, e.g. `/api/images/urn:nasa:pds:...`
    pub path: String,
    /// Query parameters in the order received
    pub query: Vec<(String, String)>,
    /// Pre-parsed `lid` path parameter, when the gateway provides one
    pub lid: Option<String>,
}

impl GatewayRequest {
    /// Look up a query parameter by name (first match wins)
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required_param(&self, name: &str) -> Result<&str> {
        self.param(name)
            .ok_or_else(|| SisError::MissingParameter(name.to_string()))
    }
}

/// An angular size in arcseconds, parsed from strings like `5 arcsec`,
/// `5arcmin`, or `0.25 deg`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularSize {
    arcsec: f64,
}

impl AngularSize {
    /// Parse an angular size string and clamp it to the accepted range
    /// of 1 arcsecond to 15 arcminutes.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |message: &str| SisError::InvalidParameter {
            name: "size".to_string(),
            message: message.to_string(),
        };

        let trimmed = raw.trim();
        let unit_start = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| invalid("missing unit"))?;
        let (value_part, unit_part) = trimmed.split_at(unit_start);

        let value: f64 = value_part
            .trim()
            .parse()
            .map_err(|_| invalid("not a number"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid("must be a non-negative finite number"));
        }

        let arcsec = match unit_part.trim() {
            "arcsec" => value,
            "arcmin" => value * 60.0,
            "deg" | "degree" | "degrees" => value * 3600.0,
            other => {
                return Err(invalid(&format!("unknown unit '{}'", other)));
            }
        };

        Ok(AngularSize {
            arcsec: arcsec.clamp(MIN_SIZE_ARCSEC, MAX_SIZE_ARCSEC),
        })
    }

    /// The size in arcseconds
    pub fn arcsec(&self) -> f64 {
        self.arcsec
    }
}

/// The validated parameters of one cutout request.
///
/// Construction performs all input validation up front; no network or
/// storage I/O happens before a `CutoutRequest` exists.
#[derive(Debug, Clone)]
pub struct CutoutRequest {
    pub lid: Lid,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub size: AngularSize,
    pub format: ImageFormat,
}

impl CutoutRequest {
    /// Validate a gateway request into a `CutoutRequest`.
    ///
    /// The identifier is taken from the `lid` path parameter when
    /// present, otherwise from the `lid` query parameter. `ra`, `dec`,
    /// and `size` are required; `format` defaults to FITS.
    pub fn from_gateway(request: &GatewayRequest) -> Result<Self> {
        let format = ImageFormat::negotiate(request.param("format"))?;

        let raw_lid = match &request.lid {
            Some(lid) => lid.as_str(),
            None => request.required_param("lid")?,
        };
        let lid = Lid::parse(raw_lid)?;

        let ra_deg = parse_degrees(request.required_param("ra")?, "ra", 0.0, 360.0)?;
        let dec_deg = parse_degrees(request.required_param("dec")?, "dec", -90.0, 90.0)?;
        let size = AngularSize::parse(request.required_param("size")?)?;

        Ok(CutoutRequest {
            lid,
            ra_deg,
            dec_deg,
            size,
            format,
        })
    }
}

fn parse_degrees(raw: &str, name: &str, min: f64, max: f64) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| SisError::InvalidParameter {
        name: name.to_string(),
        message: format!("'{}' is not a number", raw),
    })?;
    if !value.is_finite() || value < min || value > max {
        return Err(SisError::InvalidParameter {
            name: name.to_string(),
            message: format!("{} is outside [{}, {}] degrees", value, min, max),
        });
    }
    Ok(value)
}

/// The uniform response envelope returned to the gateway.
///
/// Field names follow the Lambda proxy-integration contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

fn cors_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        "GET, POST, OPTIONS".to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        "Content-Type, Authorization".to_string(),
    );
    headers
}

impl ResponseEnvelope {
    /// Build a 200 response carrying base64-encoded image bytes
    pub fn success(body: &[u8], format: ImageFormat) -> Self {
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), format.content_type().to_string());
        ResponseEnvelope {
            status_code: 200,
            headers,
            body: BASE64.encode(body),
            is_base64_encoded: true,
        }
    }

    /// Build an error response from the service taxonomy.
    ///
    /// Error bodies are plain text. Internal errors are reported with a
    /// generic message; the detail stays in the logs.
    pub fn from_error(error: &SisError) -> Self {
        let status = error.to_http_status();
        let body = if status >= 500 {
            "internal server error".to_string()
        } else {
            error.to_string()
        };
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        ResponseEnvelope {
            status_code: status,
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}
