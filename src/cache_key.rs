//! Cache key derivation from the inbound request shape
//!
//! The cache is addressed purely by the request path and query string,
//! never by response content, so identical requests always land on the
//! same object-store key. Query parameters are appended in the order
//! received; callers must keep parameter ordering stable or equivalent
//! requests will miss each other's cache entries.

use crate::error::{Result, SisError};

/// Characters that are unsafe in object-store keys
const UNSAFE_CHARS: [char; 6] = ['/', ':', '?', '&', '=', '.'];

/// Derive the cache object key for a request.
///
/// The query parameters are joined as `key=value` pairs with `&` and
/// appended to the path; the substring after the last `/` is sanitized
/// by replacing `/ : ? & = .` with `_`; finally the format marker
/// suffix is rewritten into a file extension (`.jpeg`, `.png`, or the
/// `.fits` default when no recognized marker is present).
///
/// Note that `.` and `:` both collapse to `_`, so two raw identifiers
/// differing only in punctuation can share a key. This is a property of
/// the historical key scheme and is kept as-is.
///
/// # Arguments
/// * `path` - The request path
/// * `query` - Query parameters in the order received
///
/// # Returns
/// * `Ok(String)` - the derived file name, extension included
/// * `Err(SisError::EmptyFilename)` if the sanitized stem is empty
pub fn derive_cache_key(path: &str, query: &[(String, String)]) -> Result<String> {
    let full = if query.is_empty() {
        path.to_string()
    } else {
        let query_string: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("{}?{}", path, query_string.join("&"))
    };

    let after_slash = match full.rfind('/') {
        Some(index) => &full[index + 1..],
        None => full.as_str(),
    };

    let safe: String = after_slash
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let lower = safe.to_ascii_lowercase();
    let (stem, extension) = if lower.contains("_format_jpeg") || lower.contains("_format_jpg") {
        let stem = remove_marker(&safe, "_format_jpeg");
        (remove_marker(&stem, "_format_jpg"), ".jpeg")
    } else if lower.contains("_format_png") {
        (remove_marker(&safe, "_format_png"), ".png")
    } else {
        // No recognized marker: fall back to the archive-native format.
        (remove_marker(&safe, "_format_fits"), ".fits")
    };

    if stem.is_empty() {
        return Err(SisError::EmptyFilename);
    }

    Ok(format!("{}{}", stem, extension))
}

/// Remove every case-insensitive occurrence of `marker` from `input`.
/// ASCII lowercasing keeps byte offsets aligned between the two views.
fn remove_marker(input: &str, marker: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let lower = input.to_ascii_lowercase();
    let mut position = 0;
    while let Some(found) = lower[position..].find(marker) {
        output.push_str(&input[position..position + found]);
        position += found + marker.len();
    }
    output.push_str(&input[position..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_fits_extension_without_marker() {
        let key = derive_cache_key(
            "/api/images/urn:nasa:pds:gbo.ast.catalina.survey:data_calibrated:703_20220122_2b_n32022_01_0003.arch",
            &query(&[("ra", "107.10813"), ("dec", "30.84928"), ("size", "5arcmin")]),
        )
        .unwrap();
        assert!(key.ends_with(".fits"), "got {}", key);
        assert!(key.starts_with("urn_nasa_pds_gbo_ast_catalina_survey_data_calibrated_703_20220122_2b_n32022_01_0003_arch"));
    }

    #[test]
    fn test_jpeg_marker_rewrite() {
        let key = derive_cache_key(
            "/api/images/product",
            &query(&[("ra", "1"), ("dec", "2"), ("size", "5 arcsec"), ("format", "jpeg")]),
        )
        .unwrap();
        assert!(key.ends_with(".jpeg"));
        assert!(!key.contains("_format_"));
    }

    #[test]
    fn test_jpg_marker_rewrites_to_jpeg() {
        let key = derive_cache_key("/api/images/product", &query(&[("format", "jpg")])).unwrap();
        assert_eq!(key, "product.jpeg");
    }

    #[test]
    fn test_png_marker_rewrite() {
        let key = derive_cache_key("/api/images/product", &query(&[("format", "png")])).unwrap();
        assert_eq!(key, "product.png");
    }

    #[test]
    fn test_fits_marker_is_dropped() {
        let key = derive_cache_key("/api/images/product", &query(&[("format", "fits")])).unwrap();
        assert_eq!(key, "product.fits");
    }

    #[test]
    fn test_unsafe_characters_are_substituted() {
        let key = derive_cache_key("/a/urn:x.y", &[]).unwrap();
        assert_eq!(key, "urn_x_y.fits");
    }

    #[test]
    fn test_query_order_is_preserved() {
        let forward = derive_cache_key("/a/p", &query(&[("ra", "1"), ("dec", "2")])).unwrap();
        let reversed = derive_cache_key("/a/p", &query(&[("dec", "2"), ("ra", "1")])).unwrap();
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let params = query(&[("ra", "107.1"), ("dec", "30.8"), ("size", "5arcmin")]);
        let first = derive_cache_key("/api/images/p.arch", &params).unwrap();
        let second = derive_cache_key("/api/images/p.arch", &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_stem_fails() {
        let result = derive_cache_key("/api/images/", &[]);
        assert!(matches!(result, Err(SisError::EmptyFilename)));
    }

    // Known property of the substitution scheme: punctuation choices
    // collapse to the same key. Documented, not fixed.
    #[test]
    fn test_punctuation_collision_is_expected() {
        let dotted = derive_cache_key("/a/p.q", &[]).unwrap();
        let colon = derive_cache_key("/a/p:q", &[]).unwrap();
        assert_eq!(dotted, colon);
    }
}
