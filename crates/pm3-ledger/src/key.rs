//! # Composite Keys
//!
//! A composite key is `U+0000 objectType U+0000 attr1 U+0000 … attrN U+0000`.
//! Every namespace shares one world state, so the leading separator keeps
//! composite keys disjoint from plain keys and the trailing separator after
//! each attribute makes a partial key a strict prefix of exactly the keys
//! that extend it (`PKG-1` never matches `PKG-10`).

use crate::error::LedgerError;

const SEP: char = '\u{0}';
const MAX_RUNE: char = '\u{10FFFF}';

fn check_component(what: &str, s: &str) -> Result<(), LedgerError> {
    if s.contains(SEP) || s.contains(MAX_RUNE) {
        return Err(LedgerError::InvalidCompositeKey(format!(
            "{what} {s:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// Build the full composite key for `object_type` and `attributes`.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> Result<String, LedgerError> {
    if object_type.is_empty() {
        return Err(LedgerError::InvalidCompositeKey(
            "object type must not be empty".into(),
        ));
    }
    check_component("object type", object_type)?;
    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(SEP);
    key.push_str(object_type);
    key.push(SEP);
    for attr in attributes {
        check_component("attribute", attr)?;
        key.push_str(attr);
        key.push(SEP);
    }
    Ok(key)
}

/// The prefix shared by every key of `object_type` whose leading attributes
/// equal `attributes`. Identical to [`composite_key`]; named separately so
/// range-scan call sites read as such.
pub fn partial_composite_key(
    object_type: &str,
    attributes: &[&str],
) -> Result<String, LedgerError> {
    composite_key(object_type, attributes)
}

/// Split a composite key back into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), LedgerError> {
    let body = key
        .strip_prefix(SEP)
        .and_then(|k| k.strip_suffix(SEP))
        .ok_or_else(|| LedgerError::InvalidCompositeKey(format!("{key:?} is not composite")))?;
    let mut parts = body.split(SEP).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LedgerError::InvalidCompositeKey(format!("{key:?} has no object type")))?;
    Ok((object_type, parts.collect()))
}

/// Render a key for logs and error messages.
pub fn printable(key: &str) -> String {
    key.trim_matches(SEP).replace(SEP, "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_matches_fabric_layout() {
        let k = composite_key("terms", &["PKG-1", "T1"]).unwrap();
        assert_eq!(k, "\u{0}terms\u{0}PKG-1\u{0}T1\u{0}");
    }

    #[test]
    fn split_roundtrip() {
        let k = composite_key("package", &["PKG-1"]).unwrap();
        let (ty, attrs) = split_composite_key(&k).unwrap();
        assert_eq!(ty, "package");
        assert_eq!(attrs, vec!["PKG-1".to_string()]);
    }

    #[test]
    fn prefix_does_not_match_longer_ids() {
        let prefix = partial_composite_key("terms", &["PKG-1"]).unwrap();
        let other = composite_key("terms", &["PKG-10", "T1"]).unwrap();
        let own = composite_key("terms", &["PKG-1", "T1"]).unwrap();
        assert!(own.starts_with(&prefix));
        assert!(!other.starts_with(&prefix));
    }

    #[test]
    fn reserved_characters_rejected() {
        assert!(composite_key("terms", &["PKG\u{0}1"]).is_err());
        assert!(composite_key("", &["x"]).is_err());
        assert!(composite_key("t", &["\u{10FFFF}"]).is_err());
    }

    #[test]
    fn split_rejects_plain_keys() {
        assert!(split_composite_key("PKG-1").is_err());
        assert!(split_composite_key("\u{0}\u{0}").is_err());
    }

    #[test]
    fn printable_form() {
        let k = composite_key("terms", &["PKG-1", "T1"]).unwrap();
        assert_eq!(printable(&k), "terms/PKG-1/T1");
    }

    fn component() -> impl Strategy<Value = String> {
        "[A-Za-z0-9:._-]{0,12}"
    }

    proptest! {
        #[test]
        fn split_inverts_composite(
            ty in "[a-zA-Z]{1,10}",
            attrs in prop::collection::vec(component(), 0..4),
        ) {
            let refs: Vec<&str> = attrs.iter().map(String::as_str).collect();
            let key = composite_key(&ty, &refs).unwrap();
            let (t, a) = split_composite_key(&key).unwrap();
            prop_assert_eq!(t, ty);
            prop_assert_eq!(a, attrs);
        }

        #[test]
        fn partial_key_matches_only_extensions(
            a in component(),
            b in component(),
            rest in component(),
        ) {
            let prefix = partial_composite_key("terms", &[a.as_str()]).unwrap();
            let key = composite_key("terms", &[b.as_str(), rest.as_str()]).unwrap();
            prop_assert_eq!(key.starts_with(&prefix), a == b);
        }
    }
}
