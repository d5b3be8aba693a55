// Property: cache key derivation is deterministic, and requests that
// differ in any parameter value derive different keys. Punctuation
// characters all collapse to `_`, so raw strings differing only in
// punctuation choice may legitimately share a key; that collision is
// documented in the unit tests and excluded from the uniqueness
// property here by generating alphanumeric values.

use proptest::prelude::*;
use sbn_sis::derive_cache_key;

fn query(pairs: &[(String, String)]) -> Vec<(String, String)> {
    pairs.to_vec()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Identical path and query always derive identical keys.
    #[test]
    fn prop_derivation_is_deterministic(
        stem in "[a-z0-9_]{1,40}",
        ra in "[0-9]{1,3}",
        dec in "[0-9]{1,2}",
    ) {
        let path = format!("/api/images/{}", stem);
        let params = query(&[
            ("ra".to_string(), ra),
            ("dec".to_string(), dec),
            ("size".to_string(), "5arcmin".to_string()),
        ]);
        let first = derive_cache_key(&path, &params).unwrap();
        let second = derive_cache_key(&path, &params).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Requests differing in a parameter value derive different keys.
    #[test]
    fn prop_differing_values_derive_different_keys(
        stem in "[a-z0-9_]{1,40}",
        ra1 in "[0-9]{1,4}",
        ra2 in "[0-9]{1,4}",
    ) {
        prop_assume!(ra1 != ra2);
        let path = format!("/api/images/{}", stem);
        let key1 = derive_cache_key(&path, &query(&[("ra".to_string(), ra1)])).unwrap();
        let key2 = derive_cache_key(&path, &query(&[("ra".to_string(), ra2)])).unwrap();
        prop_assert_ne!(key1, key2);
    }

    /// Requests differing in path stem derive different keys.
    #[test]
    fn prop_differing_stems_derive_different_keys(
        stem1 in "[a-z0-9_]{1,40}",
        stem2 in "[a-z0-9_]{1,40}",
    ) {
        prop_assume!(stem1 != stem2);
        let params = query(&[("size".to_string(), "5arcmin".to_string())]);
        let key1 = derive_cache_key(&format!("/api/images/{}", stem1), &params).unwrap();
        let key2 = derive_cache_key(&format!("/api/images/{}", stem2), &params).unwrap();
        prop_assert_ne!(key1, key2);
    }

    /// Every derived key carries a recognized extension and no residual
    /// unsafe characters.
    #[test]
    fn prop_keys_are_object_store_safe(
        stem in "[a-z0-9_]{1,40}",
        format in prop_oneof![
            Just(None),
            Just(Some("fits")),
            Just(Some("jpeg")),
            Just(Some("jpg")),
            Just(Some("png")),
        ],
    ) {
        let mut params = vec![("ra".to_string(), "107.1".to_string())];
        if let Some(format) = format {
            params.push(("format".to_string(), format.to_string()));
        }
        let key = derive_cache_key(&format!("/api/images/{}", stem), &params).unwrap();

        let (key_stem, extension) = key.rsplit_once('.').unwrap();
        prop_assert!(matches!(extension, "fits" | "jpeg" | "png"));
        prop_assert!(!key_stem.contains(['/', ':', '?', '&', '=', '.']));
    }
}
