//! Geometry Types
//!
//! The design tool stores geometry in two shapes:
//!
//! - **Position strings**: a point packed as text, `"{0.5, 0.67135115527602085}"`
//! - **Rect objects**: `{"_class": "rect", "x": 0, "y": 0, "width": 75.5, "height": 15,
//!   "constrainProportions": false}`
//!
//! Older files also carry rects as nested position strings, `"{{0, 0}, {75.5, 15}}"`.
//! Both rect shapes decode into [`Rect`]; encoding always produces the object shape.

use crate::models::coerce::{coerce_bool, coerce_number, FieldValue};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Matches one `{x, y}` pair; numbers may be signed, zero-padded or exponential
const POINT_PATTERN: &str = r"\{\s*([-+0-9.eE]*)\s*,\s*([-+0-9.eE]*)\s*\}";

fn point_regex() -> &'static Regex {
    static POINT_REGEX: OnceLock<Regex> = OnceLock::new();
    POINT_REGEX.get_or_init(|| Regex::new(POINT_PATTERN).unwrap())
}

fn parse_component(text: &str) -> f64 {
    coerce_number(&Value::String(text.to_string()))
}

/// A 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse the first `{x, y}` pair in `text`
    ///
    /// Returns `None` when no pair is present. Components that do not parse as
    /// numbers coerce to `0`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sketchapp_core::models::Point;
    ///
    /// assert_eq!(Point::parse("{0000021, -12345}"), Some(Point::new(21.0, -12345.0)));
    /// assert_eq!(Point::parse("{10.05, -10.66}"), Some(Point::new(10.05, -10.66)));
    /// assert_eq!(Point::parse("nowhere"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let caps = point_regex().captures(text)?;
        Some(Self::new(parse_component(&caps[1]), parse_component(&caps[2])))
    }

    /// Format as a position string, the inverse of [`Point::parse`]
    pub fn serialize(&self) -> String {
        format!("{{{}, {}}}", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FieldValue for Point {
    fn coerce(raw: &Value) -> Self {
        match raw {
            Value::String(text) => Point::parse(text).unwrap_or_else(|| {
                tracing::trace!("Unparseable position string {:?}, using origin", text);
                Point::default()
            }),
            _ => Point::default(),
        }
    }

    fn emit(&self) -> Option<Value> {
        Some(Value::String(self.serialize()))
    }
}

/// An axis-aligned frame with a proportion lock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub constrain_proportions: bool,
}

impl Rect {
    pub const CLASS: &'static str = "rect";
    pub const DEFAULT_SIZE: f64 = 100.0;

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            constrain_proportions: false,
        }
    }

    /// Decode the named-field object form
    ///
    /// Each field defaults independently: position to `0`, size to `100`,
    /// the proportion lock to `false`.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let number = |key: &str, default: f64| object.get(key).map(coerce_number).unwrap_or(default);
        Self {
            x: number("x", 0.0),
            y: number("y", 0.0),
            width: number("width", Self::DEFAULT_SIZE),
            height: number("height", Self::DEFAULT_SIZE),
            constrain_proportions: object
                .get("constrainProportions")
                .map(coerce_bool)
                .unwrap_or(false),
        }
    }

    /// Decode the legacy nested position string `{{x, y}, {w, h}}`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sketchapp_core::models::Rect;
    ///
    /// let rect = Rect::parse_nested("{{0, 0}, {75.5, 15}}").unwrap();
    /// assert_eq!((rect.width, rect.height), (75.5, 15.0));
    /// ```
    pub fn parse_nested(text: &str) -> Option<Self> {
        let mut pairs = point_regex().captures_iter(text);
        let origin = pairs.next()?;
        let size = pairs.next()?;
        Some(Self::new(
            parse_component(&origin[1]),
            parse_component(&origin[2]),
            parse_component(&size[1]),
            parse_component(&size[2]),
        ))
    }

    /// Encode the canonical named-field object form
    pub fn serialize(&self) -> Value {
        json!({
            "_class": Self::CLASS,
            "constrainProportions": self.constrain_proportions,
            "height": self.height,
            "width": self.width,
            "x": self.x,
            "y": self.y,
        })
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, Self::DEFAULT_SIZE, Self::DEFAULT_SIZE)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={} y={} w={} h={}", self.x, self.y, self.width, self.height)?;
        if self.constrain_proportions {
            f.write_str(" constrain=true")?;
        }
        f.write_str(")")
    }
}

impl FieldValue for Rect {
    fn coerce(raw: &Value) -> Self {
        match raw {
            Value::Object(object) => Rect::from_object(object),
            Value::String(text) => Rect::parse_nested(text).unwrap_or_else(|| {
                tracing::trace!("Unparseable nested rect string {:?}, using default frame", text);
                Rect::default()
            }),
            _ => Rect::default(),
        }
    }

    fn emit(&self) -> Option<Value> {
        Some(self.serialize())
    }
}
