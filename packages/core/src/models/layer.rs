//! Layer Variants
//!
//! Every node that may appear inside a `layers` array. All variants share the
//! common layer fields (identity, frame, flags, name, style); the
//! [`Layer`] enum dispatches on `_class` and is the only place where an
//! unknown discriminator is an error.
//!
//! Container variants (`artboard`, `symbolMaster`, `group`, `shapeGroup`)
//! own child layers. The children are not fields of the variant structs: they
//! live in the page's [`LayerTree`](crate::models::LayerTree), which also
//! keeps the parent links.

use crate::models::assets::{ExportOptions, ImageReference, RulerData};
use crate::models::coerce::{ObjectId, RawValue};
use crate::models::geometry::{Point, Rect};
use crate::models::schema::{SchemaError, SchemaNode, CLASS_KEY};
use crate::models::style::{Color, Style};
use crate::schema_node;
use serde_json::{Map, Value};
use std::fmt;

/// Declare a layer variant: the common layer fields followed by its own
macro_rules! layer_node {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($class:literal, name = $default_name:literal) {
            $($body:tt)*
        }
    ) => {
        schema_node! {
            $(#[$meta])*
            pub struct $name($class) {
                "do_objectID" => object_id: ObjectId = null,
                "exportOptions" => export_options: ExportOptions = null,
                "frame" => frame: Rect = null,
                "isFlippedHorizontal" => is_flipped_horizontal: bool = false,
                "isFlippedVertical" => is_flipped_vertical: bool = false,
                "isLocked" => is_locked: bool = false,
                "isVisible" => is_visible: bool = true,
                "layerListExpandedType" => layer_list_expanded_type: i64 = 0,
                "name" => name: String = $default_name,
                "nameIsFixed" => name_is_fixed: bool = false,
                "resizingType" => resizing_type: i64 = 0,
                "rotation" => rotation: f64 = 0,
                "shouldBreakMaskChain" => should_break_mask_chain: bool = false,
                "style" => style: Style = null,
                $($body)*
            }
        }
    };
}

schema_node! {
    /// One vertex of a vector path, with optional curve handles
    pub struct CurvePoint("curvePoint") {
        "cornerRadius" => corner_radius: f64 = 0,
        "curveFrom" => curve_from: Point = null,
        "curveMode" => curve_mode: i64 = 1,
        "curveTo" => curve_to: Point = null,
        "hasCurveFrom" => has_curve_from: bool = false,
        "hasCurveTo" => has_curve_to: bool = false,
        "point" => point: Point = null,
    }
}

impl CurvePoint {
    /// A straight corner at `point`, handles collapsed onto it
    pub fn corner(point: Point) -> Self {
        Self {
            curve_from: point,
            curve_to: point,
            point,
            ..Self::default()
        }
    }

    /// The unit-square outline used for new rectangles and ovals
    pub fn unit_square() -> Vec<Self> {
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .into_iter()
            .map(|(x, y)| Self::corner(Point::new(x, y)))
            .collect()
    }
}

layer_node! {
    /// Text box; the attributed string stays opaque
    pub struct Text("text", name = "") {
        "originalObjectID" => original_object_id: Option<ObjectId> = null,
        "attributedString" => attributed_string: RawValue = null,
        "automaticallyDrawOnUnderlyingPath" => automatically_draw_on_underlying_path: bool = false,
        "dontSynchroniseWithSymbol" => dont_synchronise_with_symbol: bool = false,
        "glyphBounds" => glyph_bounds: Option<Rect> = null,
        "heightIsClipped" => height_is_clipped: bool = false,
        "lineSpacingBehaviour" => line_spacing_behaviour: i64 = 2,
        "textBehaviour" => text_behaviour: i64 = 0,
    }
}

layer_node! {
    /// Container combining its shape children with boolean operations
    pub struct ShapeGroup("shapeGroup", name = "") {
        "originalObjectID" => original_object_id: Option<ObjectId> = null,
        "hasClickThrough" => has_click_through: bool = false,
        "clippingMaskMode" => clipping_mask_mode: i64 = 0,
        "hasClippingMask" => has_clipping_mask: bool = false,
        "windingRule" => winding_rule: i64 = 1,
    }
}

layer_node! {
    pub struct ShapePath("shapePath", name = "Path") {
        "booleanOperation" => boolean_operation: i64 = (-1),
        "edited" => edited: bool = false,
        "isClosed" => is_closed: bool = false,
        "points" => points: Vec<CurvePoint> = [],
        "path" => path: RawValue = null,
    }
}

layer_node! {
    /// Raster image layer; pixel data lives in the archive entry named by `image`
    pub struct Bitmap("bitmap", name = "") {
        "clippingMask" => clipping_mask: Option<Rect> = null,
        "fillReplacesImage" => fill_replaces_image: bool = false,
        "image" => image: ImageReference = null,
        "nineSliceCenterRect" => nine_slice_center_rect: Option<Rect> = null,
        "nineSliceScale" => nine_slice_scale: Option<Point> = null,
    }
}

layer_node! {
    /// Top-level drawing board of a page
    pub struct Artboard("artboard", name = "Artboard") {
        "hasClickThrough" => has_click_through: bool = false,
        "backgroundColor" => background_color: Color = null,
        "hasBackgroundColor" => has_background_color: bool = false,
        "horizontalRulerData" => horizontal_ruler_data: RulerData = null,
        "verticalRulerData" => vertical_ruler_data: RulerData = null,
        "includeBackgroundColorInExport" => include_background_color_in_export: bool = false,
        "includeInCloudUpload" => include_in_cloud_upload: bool = true,
    }
}

layer_node! {
    /// Artboard that defines a reusable symbol
    pub struct SymbolMaster("symbolMaster", name = "Symbol") {
        "hasClickThrough" => has_click_through: bool = false,
        "backgroundColor" => background_color: Color = null,
        "hasBackgroundColor" => has_background_color: bool = false,
        "horizontalRulerData" => horizontal_ruler_data: RulerData = null,
        "verticalRulerData" => vertical_ruler_data: RulerData = null,
        "includeBackgroundColorInExport" => include_background_color_in_export: bool = false,
        "includeBackgroundColorInInstance" => include_background_color_in_instance: bool = false,
        "includeInCloudUpload" => include_in_cloud_upload: bool = true,
        "symbolID" => symbol_id: ObjectId = null,
    }
}

layer_node! {
    /// Placement of a symbol master; overrides are kept opaque
    pub struct SymbolInstance("symbolInstance", name = "") {
        "horizontalSpacing" => horizontal_spacing: f64 = 0,
        "masterInfluenceEdgeMaxXPadding" => master_influence_edge_max_x_padding: f64 = 0,
        "masterInfluenceEdgeMaxYPadding" => master_influence_edge_max_y_padding: f64 = 0,
        "masterInfluenceEdgeMinXPadding" => master_influence_edge_min_x_padding: f64 = 0,
        "masterInfluenceEdgeMinYPadding" => master_influence_edge_min_y_padding: f64 = 0,
        "symbolID" => symbol_id: ObjectId = null,
        "verticalSpacing" => vertical_spacing: f64 = 0,
        "overrides" => overrides: RawValue = null,
    }
}

layer_node! {
    pub struct Group("group", name = "Group") {
        "originalObjectID" => original_object_id: Option<ObjectId> = null,
        "hasClickThrough" => has_click_through: bool = false,
    }
}

layer_node! {
    pub struct Rectangle("rectangle", name = "Rectangle") {
        "booleanOperation" => boolean_operation: i64 = (-1),
        "edited" => edited: bool = false,
        "isClosed" => is_closed: bool = true,
        "points" => points: Vec<CurvePoint> = [],
        "path" => path: RawValue = null,
        "fixedRadius" => fixed_radius: f64 = 0,
        "hasConvertedToNewRoundCorners" => has_converted_to_new_round_corners: bool = true,
    }
}

layer_node! {
    pub struct Oval("oval", name = "Oval") {
        "booleanOperation" => boolean_operation: i64 = (-1),
        "edited" => edited: bool = false,
        "isClosed" => is_closed: bool = true,
        "points" => points: Vec<CurvePoint> = [],
        "path" => path: RawValue = null,
    }
}

/// Any node that may appear inside a `layers` array
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Text(Text),
    ShapeGroup(ShapeGroup),
    ShapePath(ShapePath),
    Bitmap(Bitmap),
    Artboard(Artboard),
    SymbolMaster(SymbolMaster),
    SymbolInstance(SymbolInstance),
    Group(Group),
    Rectangle(Rectangle),
    Oval(Oval),
}

/// Apply one expression to whichever variant struct `$layer` holds
macro_rules! with_layer {
    ($layer:expr, $inner:ident => $body:expr) => {
        match $layer {
            Layer::Text($inner) => $body,
            Layer::ShapeGroup($inner) => $body,
            Layer::ShapePath($inner) => $body,
            Layer::Bitmap($inner) => $body,
            Layer::Artboard($inner) => $body,
            Layer::SymbolMaster($inner) => $body,
            Layer::SymbolInstance($inner) => $body,
            Layer::Group($inner) => $body,
            Layer::Rectangle($inner) => $body,
            Layer::Oval($inner) => $body,
        }
    };
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Layer {
                fn from(layer: $variant) -> Self {
                    Layer::$variant(layer)
                }
            }
        )*
    };
}

impl_from_variant!(
    Text,
    ShapeGroup,
    ShapePath,
    Bitmap,
    Artboard,
    SymbolMaster,
    SymbolInstance,
    Group,
    Rectangle,
    Oval,
);

impl Layer {
    /// Discriminators accepted inside a `layers` array
    pub const CLASSES: &'static [&'static str] = &[
        Text::CLASS,
        ShapeGroup::CLASS,
        ShapePath::CLASS,
        Bitmap::CLASS,
        Artboard::CLASS,
        SymbolMaster::CLASS,
        SymbolInstance::CLASS,
        Group::CLASS,
        Rectangle::CLASS,
        Oval::CLASS,
    ];

    /// Decode one element of a `layers` array, without its children
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownLayerType` when the element is not an
    /// object or its `_class` is missing or not in [`Layer::CLASSES`].
    pub fn decode(value: &Value) -> Result<Self, SchemaError> {
        let Some(object) = value.as_object() else {
            return Err(SchemaError::unknown_layer_type(""));
        };
        let class = object.get(CLASS_KEY).and_then(Value::as_str).unwrap_or("");
        Self::decode_class(class, object).ok_or_else(|| SchemaError::unknown_layer_type(class))
    }

    fn decode_class(class: &str, object: &Map<String, Value>) -> Option<Self> {
        let layer = if class == Text::CLASS {
            Layer::Text(Text::decode(object))
        } else if class == ShapeGroup::CLASS {
            Layer::ShapeGroup(ShapeGroup::decode(object))
        } else if class == ShapePath::CLASS {
            Layer::ShapePath(ShapePath::decode(object))
        } else if class == Bitmap::CLASS {
            Layer::Bitmap(Bitmap::decode(object))
        } else if class == Artboard::CLASS {
            Layer::Artboard(Artboard::decode(object))
        } else if class == SymbolMaster::CLASS {
            Layer::SymbolMaster(SymbolMaster::decode(object))
        } else if class == SymbolInstance::CLASS {
            Layer::SymbolInstance(SymbolInstance::decode(object))
        } else if class == Group::CLASS {
            Layer::Group(Group::decode(object))
        } else if class == Rectangle::CLASS {
            Layer::Rectangle(Rectangle::decode(object))
        } else if class == Oval::CLASS {
            Layer::Oval(Oval::decode(object))
        } else {
            return None;
        };
        Some(layer)
    }

    /// Encode the layer's own fields plus `_class`, without children
    pub fn to_object(&self) -> Map<String, Value> {
        let mut out = Map::new();
        with_layer!(self, layer => layer.encode_fields(&mut out));
        out.insert(CLASS_KEY.to_string(), Value::String(self.class().to_string()));
        out
    }

    pub fn class(&self) -> &'static str {
        fn class_of<T: SchemaNode>(_: &T) -> &'static str {
            T::CLASS
        }
        with_layer!(self, layer => class_of(layer))
    }

    /// Whether this variant owns child layers
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Layer::ShapeGroup(_) | Layer::Artboard(_) | Layer::SymbolMaster(_) | Layer::Group(_)
        )
    }

    pub fn name(&self) -> &str {
        with_layer!(self, layer => layer.name.as_str())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        with_layer!(self, layer => layer.name = name)
    }

    pub fn object_id(&self) -> &ObjectId {
        with_layer!(self, layer => &layer.object_id)
    }

    pub fn set_object_id(&mut self, id: ObjectId) {
        with_layer!(self, layer => layer.object_id = id)
    }

    pub fn frame(&self) -> &Rect {
        with_layer!(self, layer => &layer.frame)
    }

    pub fn frame_mut(&mut self) -> &mut Rect {
        with_layer!(self, layer => &mut layer.frame)
    }

    pub fn style(&self) -> &Style {
        with_layer!(self, layer => &layer.style)
    }

    pub fn style_mut(&mut self) -> &mut Style {
        with_layer!(self, layer => &mut layer.style)
    }

    pub fn is_visible(&self) -> bool {
        with_layer!(self, layer => layer.is_visible)
    }

    /// Dynamic read of a declared field (see [`SchemaNode::field`])
    pub fn field(&self, name: &str) -> Option<Value> {
        with_layer!(self, layer => layer.field(name))
    }

    /// Dynamic write of a declared field (see [`SchemaNode::set_field`])
    pub fn set_field(&mut self, name: &str, value: &Value) -> Result<(), SchemaError> {
        with_layer!(self, layer => layer.set_field(name, value))
    }

    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Layer::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    pub fn as_bitmap_mut(&mut self) -> Option<&mut Bitmap> {
        match self {
            Layer::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Artboard(_) | Layer::Bitmap(_) => {
                write!(f, "<{} name={} frame={}>", self.class(), self.name(), self.frame())
            }
            _ => write!(f, "<{} name={}>", self.class(), self.name()),
        }
    }
}
