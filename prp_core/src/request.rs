//! Request mapping accepted from a transport collaborator.
//!
//! A request is a JSON object with keys `thrombocytes` (required),
//! `prp_yield`, `prp_concentration` and `ppp_concentration`. Absent optional
//! keys fall back to the protocol defaults.

use crate::config::ProtocolDefaults;
use crate::{DosageInputs, Error, Result};
use serde_json::{Map, Value};

pub const THROMBOCYTES: &str = "thrombocytes";
pub const PRP_YIELD: &str = "prp_yield";
pub const PRP_CONCENTRATION: &str = "prp_concentration";
pub const PPP_CONCENTRATION: &str = "ppp_concentration";

/// Parse a raw request body into a mapping
pub fn parse_body(body: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Rejecting request body: {}", e);
        Error::MalformedRequest("Invalid JSON data".into())
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::MalformedRequest(
            "Request body must be a JSON object".into(),
        )),
    }
}

/// Build calculator inputs from a request mapping
///
/// Fails with `MissingField` when `thrombocytes` is absent. Positivity is not
/// checked here; that belongs to the calculator.
pub fn inputs_from_map(map: &Map<String, Value>, defaults: &ProtocolDefaults) -> Result<DosageInputs> {
    let thrombocytes_gl = match map.get(THROMBOCYTES) {
        Some(value) => coerce(THROMBOCYTES, value)?,
        None => return Err(Error::MissingField(THROMBOCYTES.into())),
    };

    Ok(DosageInputs {
        thrombocytes_gl,
        prp_yield_ml: optional(map, PRP_YIELD, defaults.prp_yield_ml)?,
        prp_concentration_x: optional(map, PRP_CONCENTRATION, defaults.prp_concentration_x)?,
        ppp_concentration_x: optional(map, PPP_CONCENTRATION, defaults.ppp_concentration_x)?,
    })
}

fn optional(map: &Map<String, Value>, field: &str, default: f64) -> Result<f64> {
    map.get(field)
        .map(|value| coerce(field, value))
        .unwrap_or(Ok(default))
}

/// Lenient numeric coercion: numbers, numeric strings and booleans
fn coerce(field: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(Error::NonNumeric {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test value must be an object"),
        }
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let inputs =
            inputs_from_map(&map(json!({"thrombocytes": 200})), &ProtocolDefaults::default())
                .unwrap();
        assert_eq!(inputs, DosageInputs::new(200.0));
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let request = map(json!({
            "thrombocytes": 250.5,
            "prp_yield": 1.5,
            "prp_concentration": 6,
            "ppp_concentration": 0
        }));
        let inputs = inputs_from_map(&request, &ProtocolDefaults::default()).unwrap();
        assert_eq!(inputs.thrombocytes_gl, 250.5);
        assert_eq!(inputs.prp_yield_ml, 1.5);
        assert_eq!(inputs.prp_concentration_x, 6.0);
        assert_eq!(inputs.ppp_concentration_x, 0.0);
    }

    #[test]
    fn test_configured_defaults_are_used() {
        let defaults = ProtocolDefaults {
            prp_yield_ml: 2.0,
            prp_concentration_x: 5.0,
            ppp_concentration_x: 0.25,
        };
        let inputs = inputs_from_map(&map(json!({"thrombocytes": 180})), &defaults).unwrap();
        assert_eq!(inputs.prp_yield_ml, 2.0);
        assert_eq!(inputs.prp_concentration_x, 5.0);
        assert_eq!(inputs.ppp_concentration_x, 0.25);
    }

    #[test]
    fn test_missing_thrombocytes() {
        let err = inputs_from_map(&map(json!({"prp_yield": 1.0})), &ProtocolDefaults::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingField(ref f) if f == "thrombocytes"));
    }

    #[test]
    fn test_numeric_strings_and_booleans_coerce() {
        let request = map(json!({"thrombocytes": " 200 ", "prp_yield": true}));
        let inputs = inputs_from_map(&request, &ProtocolDefaults::default()).unwrap();
        assert_eq!(inputs.thrombocytes_gl, 200.0);
        assert_eq!(inputs.prp_yield_ml, 1.0);
    }

    #[test]
    fn test_non_numeric_values_rejected() {
        for bad in [json!("abc"), json!(null), json!([1]), json!({"v": 1}), json!("nan"), json!("inf")] {
            let request = map(json!({"thrombocytes": 200, "prp_concentration": bad}));
            let err = inputs_from_map(&request, &ProtocolDefaults::default()).unwrap_err();
            assert!(
                matches!(err, Error::NonNumeric { ref field, .. } if field == "prp_concentration"),
                "unexpected error: {:?}",
                err
            );
        }
    }

    #[test]
    fn test_zero_thrombocytes_passes_through() {
        // Positivity is the calculator's job
        let inputs =
            inputs_from_map(&map(json!({"thrombocytes": 0})), &ProtocolDefaults::default())
                .unwrap();
        assert_eq!(inputs.thrombocytes_gl, 0.0);
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(r#"{"thrombocytes": 200}"#).is_ok());

        let err = parse_body("{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON data");

        let err = parse_body("[200]").unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }
}
