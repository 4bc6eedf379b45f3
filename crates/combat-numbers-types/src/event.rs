//! The combat number wire payload.
//!
//! Senders serialize a [`CombatNumberEvent`] as a flat JSON object:
//!
//! ```text
//! { "number": 7, "x": 100, "y": 200, "originContext": "scene1" }
//! ```
//!
//! Receivers go through [`CombatNumberEvent::from_json`], which is the one
//! place where untrusted input is validated. Numeric fields are coerced the
//! way a loosely-typed sender would expect (`"42"` becomes `42.0`, `null`
//! becomes `0.0`), and anything that does not coerce to a finite number is
//! rejected so that renderers never see `NaN` or infinities.
//!
//! Older participants name the context field `sceneId`; it is accepted as an
//! alias when decoding.

use serde::Serialize;
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::ids::ContextId;

/// Wire field carrying the origin context.
const CONTEXT_FIELD: &str = "originContext";

/// Legacy name of [`CONTEXT_FIELD`].
const LEGACY_CONTEXT_FIELD: &str = "sceneId";

/// Errors produced while encoding or decoding a payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The bytes were not valid JSON, or serialization failed.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed, but its top level is not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// A numeric field was missing or did not coerce to a finite number.
    #[error("field `{field}` is not a finite number")]
    NonFinite {
        /// Wire name of the offending field.
        field: &'static str,
    },

    /// Neither `originContext` nor `sceneId` was present.
    #[error("payload has no origin context")]
    MissingContext,

    /// The origin context was present but is not a string.
    #[error("origin context must be a string")]
    InvalidContext,
}

/// A numeric indicator ready to be rendered.
///
/// The sign convention (damage vs heal) belongs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatNumber {
    /// Magnitude of the indicator.
    pub value: f64,
    /// Horizontal position in the sender's rendering space.
    pub x: f64,
    /// Vertical position in the sender's rendering space.
    pub y: f64,
}

impl CombatNumber {
    /// Create a new indicator.
    pub const fn new(value: f64, x: f64, y: f64) -> Self {
        Self { value, x, y }
    }
}

/// The payload broadcast on the combat numbers channel.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CombatNumberEvent {
    /// Magnitude of the indicator.
    pub number: f64,
    /// Horizontal position in the sender's rendering space.
    pub x: f64,
    /// Vertical position in the sender's rendering space.
    pub y: f64,
    /// Context the event was produced in.
    pub origin_context: ContextId,
}

impl CombatNumberEvent {
    /// Build an event from its four fields.
    pub const fn new(number: f64, x: f64, y: f64, origin_context: ContextId) -> Self {
        Self {
            number,
            x,
            y,
            origin_context,
        }
    }

    /// The numeric triple handed to renderers.
    pub const fn combat_number(&self) -> CombatNumber {
        CombatNumber::new(self.number, self.x, self.y)
    }

    /// Serialize the event for the wire.
    ///
    /// JSON has no spelling for `NaN` or infinities (`serde_json` would
    /// write `null`, which receivers read as `0`), so non-finite fields are
    /// refused here instead.
    pub fn to_json(&self) -> Result<Vec<u8>, PayloadError> {
        for (field, value) in [("number", self.number), ("x", self.x), ("y", self.y)] {
            if !value.is_finite() {
                return Err(PayloadError::NonFinite { field });
            }
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate an inbound payload.
    ///
    /// Unknown fields are ignored.
    pub fn from_json(data: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(data)?;
        let Value::Object(fields) = value else {
            return Err(PayloadError::NotAnObject);
        };

        Ok(Self {
            number: finite_field(&fields, "number")?,
            x: finite_field(&fields, "x")?,
            y: finite_field(&fields, "y")?,
            origin_context: context_field(&fields)?,
        })
    }
}

/// Read a numeric field, coerce it, and require the result to be finite.
fn finite_field(fields: &Map<String, Value>, field: &'static str) -> Result<f64, PayloadError> {
    let number = coerce_number(fields.get(field));
    if number.is_finite() {
        Ok(number)
    } else {
        Err(PayloadError::NonFinite { field })
    }
}

/// Read the origin context, falling back to the legacy field name.
fn context_field(fields: &Map<String, Value>) -> Result<ContextId, PayloadError> {
    match fields
        .get(CONTEXT_FIELD)
        .or_else(|| fields.get(LEGACY_CONTEXT_FIELD))
    {
        Some(Value::String(id)) => Ok(ContextId::new(id.as_str())),
        Some(Value::Null) | None => Err(PayloadError::MissingContext),
        Some(_) => Err(PayloadError::InvalidContext),
    }
}

/// Coerce a loosely-typed JSON value to a number.
///
/// Absent fields, arrays, and objects become `NaN`; `null` and `false`
/// become `0`; `true` becomes `1`; strings are parsed by
/// [`parse_numeric_str`].
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => parse_numeric_str(text),
    }
}

/// Parse a string the way a dynamically-typed sender would.
///
/// Surrounding whitespace is ignored and an empty string is `0`. Decimal,
/// exponent, and `0x`/`0o`/`0b` prefixed integers are recognised, as is
/// `Infinity`. Everything else is `NaN`.
pub fn parse_numeric_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_radix_digits(digits, radix);
        }
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust accepts "inf" and "NaN" spellings that loosely-typed senders do not.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return f64::NAN;
    }

    trimmed.parse().unwrap_or(f64::NAN)
}

/// Unsigned digits in `radix`, accumulated in `f64` so values past any
/// integer width round instead of failing. No digits, or any non-digit
/// (including a sign), is `NaN`.
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix)
                .map(|digit| acc.mul_add(f64::from(radix), f64::from(digit)))
        })
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<CombatNumberEvent, PayloadError> {
        CombatNumberEvent::from_json(json.as_bytes())
    }

    #[test]
    fn encodes_camel_case_fields() {
        let event = CombatNumberEvent::new(7.0, 100.0, 200.0, ContextId::new("scene1"));
        let bytes = event.to_json().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "number": 7.0, "x": 100.0, "y": 200.0, "originContext": "scene1" })
        );
    }

    #[test]
    fn decodes_what_it_encodes() {
        let event = CombatNumberEvent::new(-12.5, 3.0, 4.0, ContextId::new("scene1"));
        let decoded = CombatNumberEvent::from_json(&event.to_json().unwrap()).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn non_finite_fields_are_not_encoded() {
        let context = ContextId::new("scene1");
        let nan = CombatNumberEvent::new(f64::NAN, 1.0, 2.0, context.clone());
        assert!(matches!(
            nan.to_json().unwrap_err(),
            PayloadError::NonFinite { field: "number" }
        ));
        let inf = CombatNumberEvent::new(1.0, f64::INFINITY, 2.0, context.clone());
        assert!(matches!(
            inf.to_json().unwrap_err(),
            PayloadError::NonFinite { field: "x" }
        ));
        let neg_inf = CombatNumberEvent::new(1.0, 2.0, f64::NEG_INFINITY, context);
        assert!(matches!(
            neg_inf.to_json().unwrap_err(),
            PayloadError::NonFinite { field: "y" }
        ));
    }

    #[test]
    fn string_numbers_are_coerced() {
        let event =
            decode(r#"{"number":"42","x":"10","y":"20","originContext":"scene1"}"#).unwrap();
        assert_eq!(event.combat_number(), CombatNumber::new(42.0, 10.0, 20.0));
    }

    #[test]
    fn legacy_scene_id_is_accepted() {
        let event = decode(r#"{"number":5,"x":1,"y":2,"sceneId":"abc"}"#).unwrap();
        assert_eq!(event.origin_context, ContextId::new("abc"));
    }

    #[test]
    fn origin_context_wins_over_scene_id() {
        let event =
            decode(r#"{"number":5,"x":1,"y":2,"originContext":"new","sceneId":"old"}"#).unwrap();
        assert_eq!(event.origin_context.as_str(), "new");
    }

    #[test]
    fn non_numeric_string_is_rejected() {
        let err = decode(r#"{"number":"lots","x":1,"y":2,"originContext":"s"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::NonFinite { field: "number" }));
    }

    #[test]
    fn missing_coordinate_is_rejected() {
        let err = decode(r#"{"number":1,"x":1,"originContext":"s"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::NonFinite { field: "y" }));
    }

    #[test]
    fn null_and_booleans_coerce() {
        let event = decode(r#"{"number":true,"x":null,"y":false,"originContext":"s"}"#).unwrap();
        assert_eq!(event.combat_number(), CombatNumber::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn missing_context_is_rejected() {
        let err = decode(r#"{"number":1,"x":1,"y":1}"#).unwrap_err();
        assert!(matches!(err, PayloadError::MissingContext));
    }

    #[test]
    fn numeric_context_is_rejected() {
        let err = decode(r#"{"number":1,"x":1,"y":1,"originContext":3}"#).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidContext));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(matches!(decode("[1,2,3]").unwrap_err(), PayloadError::NotAnObject));
        assert!(matches!(decode("not json").unwrap_err(), PayloadError::Json(_)));
    }

    #[test]
    fn numeric_string_parsing() {
        assert_eq!(parse_numeric_str("  12 "), 12.0);
        assert_eq!(parse_numeric_str(""), 0.0);
        assert_eq!(parse_numeric_str("-3.5"), -3.5);
        assert_eq!(parse_numeric_str("1e3"), 1000.0);
        assert_eq!(parse_numeric_str(".5"), 0.5);
        assert_eq!(parse_numeric_str("0x1A"), 26.0);
        assert_eq!(parse_numeric_str("0b101"), 5.0);
        assert!(parse_numeric_str("Infinity").is_infinite());
        assert!(parse_numeric_str("inf").is_nan());
        assert!(parse_numeric_str("NaN").is_nan());
        assert!(parse_numeric_str("12px").is_nan());
        assert!(parse_numeric_str("0x-1").is_nan());
        assert!(parse_numeric_str("0x").is_nan());
        assert!(parse_numeric_str("0b102").is_nan());
    }

    #[test]
    fn prefixed_integers_are_not_capped_at_32_bits() {
        assert_eq!(parse_numeric_str("0x100000000"), 4_294_967_296.0);
        assert_eq!(parse_numeric_str("0xFFFFFFFFFFFF"), 281_474_976_710_655.0);
        assert_eq!(parse_numeric_str("0o777"), 511.0);
    }

    #[test]
    fn infinity_string_is_rejected_at_the_boundary() {
        let err = decode(r#"{"number":"Infinity","x":1,"y":1,"originContext":"s"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::NonFinite { field: "number" }));
    }
}
