//! Schema Registry & Typed Node Base
//!
//! Every JSON object in a document archive is decoded through a static field
//! table: each node type declares its discriminator (`_class`) and, per field,
//! the JSON key, the Rust type that performs the coercion, and a default
//! expressed as raw JSON. Absent fields decode their default through the same
//! coercion path as real input, so a `null` default for a sub-schema field
//! builds that sub-schema from an empty object instead of storing nothing.
//!
//! Encoding emits exactly the declared fields plus `_class`. Input keys that
//! are not declared are dropped. A node with nothing to emit encodes to
//! `None`, and its parent omits it.
//!
//! Node types are declared with [`schema_node!`](crate::schema_node):
//!
//! ```rust
//! use sketchapp_core::models::{ColorChannel, SchemaNode};
//! use sketchapp_core::schema_node;
//! use serde_json::json;
//!
//! schema_node! {
//!     /// A two-channel swatch
//!     pub struct Swatch("swatch") {
//!         "level" => level: ColorChannel = 0,
//!         "label" => label: String = "untitled",
//!     }
//! }
//!
//! let swatch = Swatch::from_value(&json!({"level": 4, "extra": true}));
//! assert_eq!(swatch.level.value(), 1.0);
//! assert_eq!(swatch.label, "untitled");
//! assert_eq!(
//!     swatch.to_value(),
//!     Some(json!({"level": 1.0, "label": "untitled", "_class": "swatch"}))
//! );
//! ```

use crate::models::coerce::FieldValue;
use serde_json::{Map, Value};
use thiserror::Error;

/// Key carrying the discriminator in every archive object
pub const CLASS_KEY: &str = "_class";

/// Errors raised by the schema layer and the layer tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A `layers` array held an element whose discriminator is not dispatchable
    #[error("Unknown layer type: '{class}'")]
    UnknownLayerType { class: String },

    /// Dynamic access named a field the node does not declare
    #[error("Node '{class}' has no field '{field}'")]
    UnknownField { class: String, field: String },

    /// Children were attached to a leaf layer
    #[error("Layer type '{class}' cannot hold child layers")]
    NotAContainer { class: String },

    /// A layer handle does not refer to a live layer of this tree
    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    /// A move would place a layer beneath itself
    #[error("Cannot move layer {id} beneath its own descendant")]
    CycleDetected { id: String },
}

impl SchemaError {
    /// Create an unknown layer type error
    pub fn unknown_layer_type(class: impl Into<String>) -> Self {
        Self::UnknownLayerType {
            class: class.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(class: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            class: class.into(),
            field: field.into(),
        }
    }

    /// Create a not-a-container error
    pub fn not_a_container(class: impl Into<String>) -> Self {
        Self::NotAContainer {
            class: class.into(),
        }
    }

    /// Create a layer not found error
    pub fn layer_not_found(id: impl ToString) -> Self {
        Self::LayerNotFound { id: id.to_string() }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(id: impl ToString) -> Self {
        Self::CycleDetected { id: id.to_string() }
    }
}

/// A node type decoded from and encoded to a JSON object through its field table
///
/// Implementations are generated by [`schema_node!`](crate::schema_node); the
/// provided methods build on the four generated ones.
pub trait SchemaNode: Sized {
    /// Discriminator written as `_class`
    const CLASS: &'static str;

    /// Declared JSON keys in declaration order
    const FIELDS: &'static [&'static str];

    /// Build from an object, defaulting every absent field
    fn decode(object: &Map<String, Value>) -> Self;

    /// Write every declared field that has content into `out`
    fn encode_fields(&self, out: &mut Map<String, Value>);

    /// Dynamic read of one declared field, in its encoded form
    ///
    /// Returns `None` for undeclared names. `_class` is always readable.
    fn field(&self, name: &str) -> Option<Value>;

    /// Dynamic write of one declared field, coercing `value` like decoded input
    fn set_field(&mut self, name: &str, value: &Value) -> Result<(), SchemaError>;

    /// Build from any JSON value
    ///
    /// Non-objects decode as the empty object. An object carrying a different
    /// `_class` is a silent no-op: the node takes its defaults.
    fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => match object.get(CLASS_KEY).and_then(Value::as_str) {
                Some(class) if class != Self::CLASS => {
                    tracing::debug!(
                        "Expected '{}' sub-object but found '{}', using defaults",
                        Self::CLASS,
                        class
                    );
                    Self::decode(&Map::new())
                }
                _ => Self::decode(object),
            },
            None => Self::decode(&Map::new()),
        }
    }

    /// Encode to an object with `_class`, or `None` when no field has content
    fn to_value(&self) -> Option<Value> {
        let mut out = Map::new();
        self.encode_fields(&mut out);
        if out.is_empty() {
            return None;
        }
        out.insert(CLASS_KEY.to_string(), Value::String(Self::CLASS.to_string()));
        Some(Value::Object(out))
    }

    /// Whether `name` is a declared field of this node type
    fn declares(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// Decode one field: the input value if present, otherwise the declared default
pub fn decode_field<T: FieldValue>(object: &Map<String, Value>, key: &str, default: &Value) -> T {
    T::coerce(object.get(key).unwrap_or(default))
}

/// Encode one field into `out` unless it has no content
pub fn encode_field<T: FieldValue>(out: &mut Map<String, Value>, key: &str, value: &T) {
    if let Some(encoded) = value.emit() {
        out.insert(key.to_string(), encoded);
    }
}

/// Declare a schema node type from its field table
///
/// Each entry is `"jsonKey" => rust_field: Type = default`, where `default`
/// is a single JSON token tree (`0`, `true`, `"text"`, `null`, `{}`, `[]`,
/// or a parenthesized expression such as `(-1)`).
///
/// The macro generates the struct, its [`SchemaNode`] implementation, a
/// [`FieldValue`] implementation so the type nests inside other nodes, and a
/// `Default` that decodes the empty object.
#[macro_export]
macro_rules! schema_node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($class:literal) {
            $(
                $(#[$field_meta:meta])*
                $key:literal => $field:ident : $ty:ty = $default:tt
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::models::schema::SchemaNode for $name {
            const CLASS: &'static str = $class;
            const FIELDS: &'static [&'static str] = &[$($key),*];

            #[allow(unused_variables)]
            fn decode(object: &::serde_json::Map<String, ::serde_json::Value>) -> Self {
                Self {
                    $(
                        $field: $crate::models::schema::decode_field(
                            object,
                            $key,
                            &::serde_json::json!($default),
                        ),
                    )*
                }
            }

            #[allow(unused_variables)]
            fn encode_fields(&self, out: &mut ::serde_json::Map<String, ::serde_json::Value>) {
                $(
                    $crate::models::schema::encode_field(out, $key, &self.$field);
                )*
            }

            fn field(&self, name: &str) -> Option<::serde_json::Value> {
                match name {
                    $(
                        $key => Some(
                            $crate::models::coerce::FieldValue::emit(&self.$field)
                                .unwrap_or(::serde_json::Value::Null),
                        ),
                    )*
                    $crate::models::schema::CLASS_KEY => Some(::serde_json::Value::String($class.to_string())),
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: &::serde_json::Value,
            ) -> Result<(), $crate::models::schema::SchemaError> {
                match name {
                    $(
                        $key => {
                            self.$field = $crate::models::coerce::FieldValue::coerce(value);
                            Ok(())
                        }
                    )*
                    _ => Err($crate::models::schema::SchemaError::unknown_field($class, name)),
                }
            }
        }

        impl $crate::models::coerce::FieldValue for $name {
            fn coerce(raw: &::serde_json::Value) -> Self {
                <Self as $crate::models::schema::SchemaNode>::from_value(raw)
            }

            fn emit(&self) -> Option<::serde_json::Value> {
                <Self as $crate::models::schema::SchemaNode>::to_value(self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as $crate::models::schema::SchemaNode>::decode(&::serde_json::Map::new())
            }
        }
    };
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;
