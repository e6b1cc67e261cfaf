//! Asset, Reference and Shared-Container Sub-Schemas
//!
//! The document-level containers (`assets`, `layerStyles`, `layerSymbols`,
//! `layerTextStyles`), the `MSJSONFileReference` that points from one archive
//! entry to another, and the small option objects layers carry.

use crate::models::coerce::{ObjectId, RawValue, UnmodeledList, UnmodeledMap};
use crate::models::style::Style;
use crate::schema_node;

/// `_ref_class` of a reference to a page entry
pub const PAGE_REF_CLASS: &str = "MSImmutablePage";

/// `_ref_class` of a reference to an image entry
pub const IMAGE_REF_CLASS: &str = "MSImageData";

schema_node! {
    /// Pointer to another archive entry, by archive-relative path
    pub struct FileReference("MSJSONFileReference") {
        "_ref_class" => ref_class: String = "MSImmutablePage",
        "_ref" => reference: String = "",
    }
}

impl FileReference {
    /// Reference to `pages/<id>`
    pub fn page(id: &ObjectId) -> Self {
        Self {
            ref_class: PAGE_REF_CLASS.to_string(),
            reference: format!("pages/{}", id),
        }
    }

    /// Object ID named by a `pages/<id>` reference
    pub fn page_id(&self) -> Option<ObjectId> {
        let id = self.reference.strip_prefix("pages/")?;
        let id = id.strip_suffix(".json").unwrap_or(id);
        Some(ObjectId::from(id))
    }
}

schema_node! {
    /// A bitmap's pointer to its image entry
    ///
    /// Same wire shape as [`FileReference`], but an absent `_ref_class`
    /// means image data.
    pub struct ImageReference("MSJSONFileReference") {
        "_ref_class" => ref_class: String = "MSImageData",
        "_ref" => reference: String = "",
    }
}

impl ImageReference {
    /// Reference to an image entry such as `images/<hash>.png`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            ref_class: IMAGE_REF_CLASS.to_string(),
            reference: path.into(),
        }
    }
}

schema_node! {
    /// Image table of the asset collection; entries are not modeled
    pub struct ImageCollection("imageCollection") {
        "images" => images: UnmodeledMap = {},
    }
}

schema_node! {
    /// Document swatches and images; only the image collection is modeled
    pub struct AssetCollection("assetCollection") {
        "colors" => colors: UnmodeledList = [],
        "gradients" => gradients: UnmodeledList = [],
        "imageCollection" => image_collection: ImageCollection = null,
        "images" => images: UnmodeledList = [],
    }
}

schema_node! {
    pub struct SharedStyle("sharedStyle") {
        "do_objectID" => object_id: ObjectId = null,
        "name" => name: String = "",
        "value" => value: Style = null,
    }
}

schema_node! {
    pub struct SharedStyleContainer("sharedStyleContainer") {
        "objects" => objects: Vec<SharedStyle> = [],
    }
}

schema_node! {
    pub struct SharedTextStyleContainer("sharedTextStyleContainer") {
        "objects" => objects: Vec<SharedStyle> = [],
    }
}

schema_node! {
    /// Symbol table; symbol definitions are kept opaque
    pub struct SymbolContainer("symbolContainer") {
        "objects" => objects: Vec<RawValue> = [],
    }
}

schema_node! {
    pub struct ExportOptions("exportOptions") {
        "exportFormats" => export_formats: Vec<RawValue> = [],
        "includedLayerIds" => included_layer_ids: Vec<String> = [],
        "layerOptions" => layer_options: i64 = 0,
        "shouldTrim" => should_trim: bool = false,
    }
}

schema_node! {
    pub struct RulerData("rulerData") {
        "base" => base: i64 = 0,
        "guides" => guides: Vec<f64> = [],
    }
}
