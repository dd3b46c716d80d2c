//! Byte-level parsing shared by every record type.

use serde::de::DeserializeOwned;

use pm3_core::ValidationError;

/// Parse `bytes` as JSON into `T`, reporting failures against `schema`.
pub fn parse_json<T: DeserializeOwned>(
    schema: &'static str,
    bytes: &[u8],
) -> Result<T, ValidationError> {
    if bytes.is_empty() {
        return Err(ValidationError::schema(schema, "empty input"));
    }
    serde_json::from_slice(bytes).map_err(|e| ValidationError::schema(schema, e.to_string()))
}

/// Require a finite, strictly positive number.
pub(crate) fn positive(
    schema: &'static str,
    field: &str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::schema(
            schema,
            format!("{field} must be a positive number"),
        ));
    }
    Ok(())
}

/// Require a finite number within `[min, max]`.
pub(crate) fn within(
    schema: &'static str,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::schema(
            schema,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn empty_input_is_a_schema_error() {
        let err = parse_json::<BTreeMap<String, u8>>("Thing", b"").unwrap_err();
        assert!(err.to_string().starts_with("Thing failed validation"));
    }

    #[test]
    fn malformed_json_names_schema() {
        let err = parse_json::<BTreeMap<String, u8>>("Thing", b"{").unwrap_err();
        assert!(matches!(err, ValidationError::Schema { schema: "Thing", .. }));
    }

    #[test]
    fn range_checks() {
        assert!(positive("S", "w", 1.0).is_ok());
        assert!(positive("S", "w", 0.0).is_err());
        assert!(positive("S", "w", f64::NAN).is_err());
        assert!(within("S", "lat", 90.0, -90.0, 90.0).is_ok());
        assert!(within("S", "lat", 90.5, -90.0, 90.0).is_err());
    }
}
