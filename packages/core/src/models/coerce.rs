//! Scalar Coercion Layer
//!
//! Converts loosely-typed JSON scalars into the strict types used by schema
//! fields. Coercion never fails: input that cannot be read as the target type
//! resolves to that type's fallback (`0`, `0.0`, `false` or `""`), and the
//! fallback is only visible as a `trace` event.
//!
//! Every type that can appear as a schema field implements [`FieldValue`],
//! which pairs the decode direction (`coerce`) with the encode direction
//! (`emit`).
//!
//! # Examples
//!
//! ```rust
//! use sketchapp_core::models::coerce::{coerce_color_channel, coerce_int, coerce_number};
//! use serde_json::json;
//!
//! assert_eq!(coerce_number(&json!("10.5")), 10.5);
//! assert_eq!(coerce_int(&json!("not a number")), 0);
//! assert_eq!(coerce_color_channel(&json!(3.2)), 1.0);
//! ```

use serde_json::{Map, Value};
use std::fmt;

/// Two-way mapping between a typed field and its JSON representation
pub trait FieldValue: Sized {
    /// Interpret a raw JSON value, falling back to the type's default on mismatch
    fn coerce(raw: &Value) -> Self;

    /// Encode back to JSON
    ///
    /// `None` signals "no content": the owning node omits the field entirely.
    fn emit(&self) -> Option<Value>;
}

fn fallback<T: fmt::Debug>(raw: &Value, target: &str, value: T) -> T {
    if !raw.is_null() {
        tracing::trace!("Coercion fallback to {:?} for {} from {}", value, target, raw);
    }
    value
}

/// Coerce to a float, `0.0` on failure
///
/// Numeric strings are parsed; booleans map to `1.0`/`0.0`. Non-finite
/// results are rejected because JSON cannot carry them back out.
pub fn coerce_number(raw: &Value) -> f64 {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed.filter(|v| v.is_finite()) {
        Some(v) => v,
        None => fallback(raw, "number", 0.0),
    }
}

/// Coerce to an integer, `0` on failure
///
/// Floats truncate toward zero. Strings must hold an integer literal.
pub fn coerce_int(raw: &Value) -> i64 {
    let parsed = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    match parsed {
        Some(v) => v,
        None => fallback(raw, "int", 0),
    }
}

/// Coerce to a boolean using JSON truthiness
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` are false; everything else is true.
pub fn coerce_bool(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Coerce to a string; total for every JSON value
///
/// `null` becomes the empty string, compound values their JSON text.
pub fn coerce_string(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Coerce to a color channel clamped to `[0, 1]`
pub fn coerce_color_channel(raw: &Value) -> f64 {
    coerce_number(raw).clamp(0.0, 1.0)
}

impl FieldValue for f64 {
    fn coerce(raw: &Value) -> Self {
        coerce_number(raw)
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::from(*self))
    }
}

impl FieldValue for i64 {
    fn coerce(raw: &Value) -> Self {
        coerce_int(raw)
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::from(*self))
    }
}

impl FieldValue for bool {
    fn coerce(raw: &Value) -> Self {
        coerce_bool(raw)
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }
}

impl FieldValue for String {
    fn coerce(raw: &Value) -> Self {
        coerce_string(raw)
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }
}

/// Absent stays absent: `null` decodes to `None` and `None` is omitted on encode
impl<T: FieldValue> FieldValue for Option<T> {
    fn coerce(raw: &Value) -> Self {
        if raw.is_null() {
            None
        } else {
            Some(T::coerce(raw))
        }
    }

    fn emit(&self) -> Option<Value> {
        self.as_ref().and_then(FieldValue::emit)
    }
}

/// Arrays decode element-wise; anything else is an empty list
///
/// Elements that encode to "no content" are dropped from the output array.
impl<T: FieldValue> FieldValue for Vec<T> {
    fn coerce(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => items.iter().map(T::coerce).collect(),
            other => {
                if !other.is_null() {
                    tracing::trace!("Coercion fallback to an empty list from {}", other);
                }
                Vec::new()
            }
        }
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::Array(self.iter().filter_map(FieldValue::emit).collect()))
    }
}

/// Bounded color channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ColorChannel(f64);

impl ColorChannel {
    /// Create a channel, clamping into `[0, 1]` (NaN becomes `0`)
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for ColorChannel {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl FieldValue for ColorChannel {
    fn coerce(raw: &Value) -> Self {
        Self::new(coerce_color_channel(raw))
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::from(self.0))
    }
}

impl fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque object identifier (`do_objectID`)
///
/// Not guaranteed unique across a document; see the page map for the one
/// place where it is used as a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FieldValue for ObjectId {
    fn coerce(raw: &Value) -> Self {
        Self(coerce_string(raw))
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::String(self.0.clone()))
    }
}

/// Opaque JSON kept verbatim for content whose inner schema is not modeled
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawValue(pub Value);

impl FieldValue for RawValue {
    fn coerce(raw: &Value) -> Self {
        Self(raw.clone())
    }

    fn emit(&self) -> Option<Value> {
        if self.0.is_null() {
            None
        } else {
            Some(self.0.clone())
        }
    }
}

/// Placeholder for a list field whose element schema is not modeled
///
/// Always decodes to empty, whatever the input held, and always encodes `[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnmodeledList;

impl FieldValue for UnmodeledList {
    fn coerce(raw: &Value) -> Self {
        if raw.as_array().is_some_and(|items| !items.is_empty()) {
            tracing::trace!("Dropping unmodeled list content: {}", raw);
        }
        Self
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::Array(Vec::new()))
    }
}

/// Placeholder for a mapping field whose value schema is not modeled
///
/// Always decodes to empty and always encodes `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnmodeledMap;

impl FieldValue for UnmodeledMap {
    fn coerce(raw: &Value) -> Self {
        if raw.as_object().is_some_and(|map| !map.is_empty()) {
            tracing::trace!("Dropping unmodeled mapping content: {}", raw);
        }
        Self
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::Object(Map::new()))
    }
}
