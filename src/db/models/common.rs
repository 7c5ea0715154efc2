//! Common types and utilities shared across models.
//!
//! Browser forms send every value as a string and older clients send `""`,
//! `0` or `false` for "not set", so the loose scalar fields on request
//! bodies go through the helpers here instead of plain serde primitives.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A scalar that may arrive as a JSON number, bool, string or null
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Trim a free-text value; blank means absent
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A numeric field as the client sent it.
///
/// Text that is not a number is kept verbatim instead of failing the request
/// body; it only fails once the row is about to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric<T> {
    Value(T),
    Invalid(String),
}

/// A numeric field held a value the store cannot take
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} value '{value}' is not numeric")]
pub struct NotNumeric {
    pub field: &'static str,
    pub value: String,
}

impl<T: Copy> Numeric<T> {
    pub fn value(&self, field: &'static str) -> Result<T, NotNumeric> {
        match self {
            Numeric::Value(v) => Ok(*v),
            Numeric::Invalid(raw) => Err(NotNumeric {
                field,
                value: raw.clone(),
            }),
        }
    }
}

/// Resolve an optional numeric field, `None` staying `None`
pub fn numeric_value<T: Copy>(
    value: Option<&Numeric<T>>,
    field: &'static str,
) -> Result<Option<T>, NotNumeric> {
    value.map(|n| n.value(field)).transpose()
}

/// Parse an optional whole number, treating blank and zero as absent
pub fn parse_optional_id(value: &str) -> Option<Numeric<i64>> {
    match parse_optional_integer(value)? {
        Numeric::Value(0) => None,
        other => Some(other),
    }
}

/// Parse an optional whole number, treating blank as absent
pub fn parse_optional_integer(value: &str) -> Option<Numeric<i64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match trimmed.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => trimmed.parse::<f64>().ok().and_then(whole_number),
    };
    Some(parsed.map_or_else(|| Numeric::Invalid(trimmed.to_string()), Numeric::Value))
}

/// Parse an optional amount, treating blank as absent
pub fn parse_optional_amount(value: &str) -> Option<Numeric<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = trimmed.parse::<f64>().ok().filter(|v| v.is_finite());
    Some(parsed.map_or_else(|| Numeric::Invalid(trimmed.to_string()), Numeric::Value))
}

/// Integral floats inside the i64 range
fn whole_number(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it would saturate
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f.fract() == 0.0 && f >= -LIMIT && f < LIMIT).then_some(f as i64)
}

/// Deserialize an optional id, accepting numbers and numeric strings
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<Numeric<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None | Some(Loose::Bool(false)) | Some(Loose::Int(0)) => None,
        Some(Loose::Int(id)) => Some(Numeric::Value(id)),
        Some(Loose::Float(f)) => match whole_number(f) {
            Some(0) => None,
            Some(id) => Some(Numeric::Value(id)),
            None => Some(Numeric::Invalid(f.to_string())),
        },
        Some(Loose::Text(s)) => parse_optional_id(&s),
        Some(Loose::Bool(true)) => Some(Numeric::Invalid("true".to_string())),
    })
}

/// Deserialize an optional amount, accepting numbers and numeric strings
pub fn deserialize_optional_amount<'de, D>(
    deserializer: D,
) -> Result<Option<Numeric<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None | Some(Loose::Bool(false)) => None,
        Some(Loose::Int(v)) => Some(Numeric::Value(v as f64)),
        Some(Loose::Float(v)) => Some(Numeric::Value(v)),
        Some(Loose::Text(s)) => parse_optional_amount(&s),
        Some(Loose::Bool(true)) => Some(Numeric::Invalid("true".to_string())),
    })
}

/// Round a currency value to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        id: Option<Numeric<i64>>,
        #[serde(default, deserialize_with = "deserialize_optional_amount")]
        amount: Option<Numeric<f64>>,
    }

    fn body(json: &str) -> Body {
        serde_json::from_str(json).unwrap()
    }

    fn invalid<T>(raw: &str) -> Option<Numeric<T>> {
        Some(Numeric::Invalid(raw.to_string()))
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(clean_optional(Some("   ")), None);
        assert_eq!(clean_optional(None), None);
    }

    #[test]
    fn test_ids_from_numbers_and_strings() {
        assert_eq!(body(r#"{"id": 7}"#).id, Some(Numeric::Value(7)));
        assert_eq!(body(r#"{"id": "7"}"#).id, Some(Numeric::Value(7)));
        assert_eq!(body(r#"{"id": 7.0}"#).id, Some(Numeric::Value(7)));
    }

    #[test]
    fn test_falsy_ids_are_absent() {
        assert_eq!(body(r#"{}"#).id, None);
        assert_eq!(body(r#"{"id": null}"#).id, None);
        assert_eq!(body(r#"{"id": ""}"#).id, None);
        assert_eq!(body(r#"{"id": 0}"#).id, None);
        assert_eq!(body(r#"{"id": false}"#).id, None);
    }

    #[test]
    fn test_bad_ids_are_kept_not_rejected() {
        assert_eq!(body(r#"{"id": "abc"}"#).id, invalid("abc"));
        assert_eq!(body(r#"{"id": 1.5}"#).id, invalid("1.5"));
    }

    #[test]
    fn test_floats_outside_i64_do_not_saturate() {
        let id = body(r#"{"id": 1e20}"#).id.unwrap();
        assert!(matches!(id, Numeric::Invalid(_)));
        assert!(id.value("user_id").is_err());

        assert!(matches!(
            parse_optional_integer("9223372036854775808"),
            Some(Numeric::Invalid(_))
        ));
        assert!(matches!(
            parse_optional_integer("-1e19"),
            Some(Numeric::Invalid(_))
        ));
        assert_eq!(parse_optional_integer("42.0"), Some(Numeric::Value(42)));
    }

    #[test]
    fn test_zero_is_kept_for_plain_integers() {
        assert_eq!(parse_optional_integer("0"), Some(Numeric::Value(0)));
        assert_eq!(parse_optional_id("0"), None);
        assert_eq!(parse_optional_id("  "), None);
    }

    #[test]
    fn test_amounts() {
        assert_eq!(body(r#"{"amount": 250}"#).amount, Some(Numeric::Value(250.0)));
        assert_eq!(body(r#"{"amount": "99.5"}"#).amount, Some(Numeric::Value(99.5)));
        assert_eq!(body(r#"{"amount": ""}"#).amount, None);
        assert_eq!(body(r#"{"amount": null}"#).amount, None);
        assert_eq!(body(r#"{"amount": "lots"}"#).amount, invalid("lots"));
    }

    #[test]
    fn test_invalid_value_names_the_field() {
        let err = numeric_value(invalid::<f64>("lots").as_ref(), "amount").unwrap_err();
        assert_eq!(err.to_string(), "amount value 'lots' is not numeric");
        assert_eq!(numeric_value::<f64>(None, "amount"), Ok(None));
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.005_1), 10.01);
        assert_eq!(round_cents(3.0), 3.0);
    }
}
