//! Data Models
//!
//! Pure data, no I/O:
//!
//! - Scalar coercion and geometry (`Point`, `Rect`)
//! - The schema node base and the `schema_node!` declaration macro
//! - Style and asset sub-schemas
//! - Layer variants, the arena `LayerTree` and `LayerFilter` queries
//! - Pages, document-level entries and the assembled `SketchFile`

mod assets;
pub mod coerce;
mod config;
mod document;
mod geometry;
mod layer;
mod layer_tree;
mod page;
mod query;
pub mod schema;
mod sketch_file;
mod style;

pub use assets::{
    AssetCollection, ExportOptions, FileReference, ImageCollection, ImageReference, RulerData,
    SharedStyle, SharedStyleContainer, SharedTextStyleContainer, SymbolContainer,
    IMAGE_REF_CLASS, PAGE_REF_CLASS,
};
pub use coerce::{
    coerce_bool, coerce_color_channel, coerce_int, coerce_number, coerce_string, ColorChannel,
    FieldValue, ObjectId, RawValue, UnmodeledList, UnmodeledMap,
};
pub use config::{IdSource, SketchConfig};
pub use document::{DocumentNode, MetaNode, UserState, Viewport, DEFAULT_PAGE_LIST_HEIGHT};
pub use geometry::{Point, Rect};
pub use layer::{
    Artboard, Bitmap, CurvePoint, Group, Layer, Oval, Rectangle, ShapeGroup, ShapePath,
    SymbolInstance, SymbolMaster, Text,
};
pub use layer_tree::{LayerId, LayerTree, LAYERS_KEY};
pub use page::{Page, PageNode};
pub use query::LayerFilter;
pub use schema::{decode_field, encode_field, SchemaError, SchemaNode, CLASS_KEY};
pub use sketch_file::{LayerRef, SketchFile, UnresolvedAsset};
pub use style::{
    Border, BorderOptions, Color, Fill, Gradient, GradientStop, GraphicsContextSettings, Style,
    TextStyle,
};
