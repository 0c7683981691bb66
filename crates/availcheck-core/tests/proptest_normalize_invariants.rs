//! Property-based invariant tests for response normalization.
//!
//! 1. Normalization never panics on arbitrary bytes.
//! 2. Every normalized result carries a verdict (never "undetermined").
//! 3. A failure verdict is always unavailable with no suggestions.
//! 4. An available verdict never carries suggestions.
//! 5. Suggestions are non-empty and unique.
//! 6. Both observed shapes agree on the same verdict and suggestions.

use availcheck_core::{ErrorKind, normalize_body, normalize_value};
use proptest::prelude::*;
use serde_json::json;

fn assert_well_shaped(r: &availcheck_core::ValidationResult) {
    assert!(r.is_available.is_some());
    if r.error.is_some() {
        assert_eq!(r.is_available, Some(false));
        assert!(r.suggestions.is_empty());
    }
    if r.is_available == Some(true) {
        assert!(r.suggestions.is_empty());
    }
    for (i, s) in r.suggestions.iter().enumerate() {
        assert!(!s.trim().is_empty());
        assert!(!r.suggestions[..i].contains(s));
    }
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(body in proptest::collection::vec(any::<u8>(), 0..256)) {
        let r = normalize_body(&body);
        assert_well_shaped(&r);
    }

    #[test]
    fn both_shapes_agree(
        verdict in any::<bool>(),
        suggestions in proptest::collection::vec("[a-z0-9-]{0,8}", 0..6),
    ) {
        let a = normalize_value(&json!({ "isAvailable": verdict, "suggestions": suggestions }));
        let b = normalize_value(&json!({ "available": verdict, "suggestions": suggestions }));
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.is_available, Some(verdict));
        prop_assert!(a.error.is_none());
        assert_well_shaped(&a);
    }

    #[test]
    fn unrecognized_keys_fail_closed(key in "[a-z]{1,12}", flag in any::<bool>()) {
        prop_assume!(key != "available");
        let mut payload = serde_json::Map::new();
        payload.insert(key, serde_json::Value::Bool(flag));
        let r = normalize_value(&serde_json::Value::Object(payload));
        prop_assert_eq!(r.error, Some(ErrorKind::MalformedResponse));
        prop_assert_eq!(r.is_available, Some(false));
    }
}
