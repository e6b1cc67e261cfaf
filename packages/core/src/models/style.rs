//! Style Sub-Schemas
//!
//! Colors, fills, borders and the `style` object every layer carries. These
//! are plain schema nodes: they never appear inside a `layers` array, so a
//! mismatched discriminator here silently falls back to defaults.

use crate::models::coerce::{ColorChannel, ObjectId, RawValue};
use crate::models::geometry::Point;
use crate::schema_node;
use std::fmt;

schema_node! {
    /// RGBA color with channels clamped to `[0, 1]`
    pub struct Color("color") {
        "red" => red: ColorChannel = 0,
        "green" => green: ColorChannel = 0,
        "blue" => blue: ColorChannel = 0,
        "alpha" => alpha: ColorChannel = 0,
    }
}

impl Color {
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: red.into(),
            green: green.into(),
            blue: blue.into(),
            alpha: alpha.into(),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<color red={} green={} blue={} alpha={}>",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

schema_node! {
    /// Blend mode and opacity applied when painting
    pub struct GraphicsContextSettings("graphicsContextSettings") {
        "blendMode" => blend_mode: i64 = 0,
        "opacity" => opacity: f64 = 1,
    }
}

schema_node! {
    pub struct GradientStop("gradientStop") {
        "color" => color: Color = null,
        "position" => position: f64 = 0,
    }
}

schema_node! {
    /// Linear, radial or angular gradient between two positions
    pub struct Gradient("gradient") {
        "elipseLength" => elipse_length: f64 = 0,
        "from" => from: Point = null,
        "gradientType" => gradient_type: i64 = 0,
        "shouldSmoothenOpacity" => should_smoothen_opacity: bool = true,
        "stops" => stops: Vec<GradientStop> = [],
        "to" => to: Point = null,
    }
}

schema_node! {
    pub struct Fill("fill") {
        "isEnabled" => is_enabled: bool = true,
        "color" => color: Color = null,
        "contextSettings" => context_settings: GraphicsContextSettings = null,
        "fillType" => fill_type: i64 = 0,
        "gradient" => gradient: Gradient = null,
        "noiseIndex" => noise_index: f64 = 0,
        "noiseIntensity" => noise_intensity: f64 = 0,
        "patternFillType" => pattern_fill_type: i64 = 1,
        "patternTileScale" => pattern_tile_scale: f64 = 1,
    }
}

schema_node! {
    pub struct Border("border") {
        "isEnabled" => is_enabled: bool = true,
        "color" => color: Color = null,
        "fillType" => fill_type: i64 = 0,
        "position" => position: i64 = 0,
        "thickness" => thickness: f64 = 1,
    }
}

schema_node! {
    pub struct BorderOptions("borderOptions") {
        "do_objectID" => object_id: ObjectId = null,
        "isEnabled" => is_enabled: bool = true,
        "dashPattern" => dash_pattern: Vec<f64> = [],
        "lineCapStyle" => line_cap_style: i64 = 0,
        "lineJoinStyle" => line_join_style: i64 = 0,
    }
}

schema_node! {
    /// Text attributes; the archived attribute blob is kept opaque
    pub struct TextStyle("textStyle") {
        "encodedAttributes" => encoded_attributes: RawValue = null,
        "verticalAlignment" => vertical_alignment: i64 = 0,
    }
}

schema_node! {
    /// Painting style shared by all layer types
    ///
    /// Effects whose inner schema is not modeled (`blur`, `shadows`,
    /// `innerShadows`, `colorControls`) pass through untouched.
    pub struct Style("style") {
        "do_objectID" => object_id: ObjectId = null,
        "borders" => borders: Vec<Border> = [],
        "borderOptions" => border_options: BorderOptions = null,
        "contextSettings" => context_settings: GraphicsContextSettings = null,
        "fills" => fills: Vec<Fill> = [],
        "textStyle" => text_style: Option<TextStyle> = null,
        "blur" => blur: RawValue = null,
        "shadows" => shadows: RawValue = null,
        "innerShadows" => inner_shadows: RawValue = null,
        "colorControls" => color_controls: RawValue = null,
        "endMarkerType" => end_marker_type: i64 = 0,
        "miterLimit" => miter_limit: i64 = 10,
        "startMarkerType" => start_marker_type: i64 = 0,
        "windingRule" => winding_rule: i64 = 1,
    }
}

impl Style {
    /// A style with a single enabled solid fill
    pub fn solid_fill(color: Color) -> Self {
        Self {
            fills: vec![Fill {
                color,
                ..Fill::default()
            }],
            ..Self::default()
        }
    }
}
