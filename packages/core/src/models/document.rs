//! Document-Level Entries
//!
//! Nodes for the three singleton archive entries: `document.json`
//! ([`DocumentNode`]), `meta.json` ([`MetaNode`]) and `user.json`
//! ([`UserState`]).

use crate::models::assets::{
    AssetCollection, FileReference, SharedStyleContainer, SharedTextStyleContainer,
    SymbolContainer,
};
use crate::models::coerce::{coerce_number, FieldValue, ObjectId, RawValue};
use crate::models::geometry::Point;
use crate::schema_node;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

schema_node! {
    /// Document settings, shared containers and the ordered page references
    pub struct DocumentNode("document") {
        "do_objectID" => object_id: ObjectId = null,
        "assets" => assets: AssetCollection = null,
        "colorSpace" => color_space: i64 = 0,
        "currentPageIndex" => current_page_index: i64 = 0,
        "enableLayerInteraction" => enable_layer_interaction: bool = false,
        "enableSliceInteraction" => enable_slice_interaction: bool = false,
        "foreignLayerStyles" => foreign_layer_styles: Vec<RawValue> = [],
        "foreignSymbols" => foreign_symbols: Vec<RawValue> = [],
        "foreignTextStyles" => foreign_text_styles: Vec<RawValue> = [],
        "layerStyles" => layer_styles: SharedStyleContainer = null,
        "layerSymbols" => layer_symbols: SymbolContainer = null,
        "layerTextStyles" => layer_text_styles: SharedTextStyleContainer = null,
        "pages" => pages: Vec<FileReference> = [],
    }
}

impl DocumentNode {
    /// Page IDs in the order the document lists them
    pub fn page_order(&self) -> Vec<ObjectId> {
        self.pages.iter().filter_map(FileReference::page_id).collect()
    }
}

schema_node! {
    /// Application and version info of the writer
    pub struct MetaNode("meta") {
        "commit" => commit: String = "",
        "appVersion" => app_version: String = "",
        "build" => build: f64 = 0,
        "app" => app: Option<String> = null,
        "version" => version: Option<i64> = null,
        "variant" => variant: Option<String> = null,
        "fonts" => fonts: Vec<String> = [],
        "autosaved" => autosaved: Option<i64> = null,
        "saveHistory" => save_history: Vec<String> = [],
        "pagesAndArtboards" => pages_and_artboards: RawValue = null,
    }
}

/// Default height of the page list panel
pub const DEFAULT_PAGE_LIST_HEIGHT: f64 = 118.0;

/// Key of the document-wide entry in `user.json`
pub const USER_DOCUMENT_KEY: &str = "document";

/// Scroll position and zoom remembered for one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_origin: Point,
    pub zoom_value: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_origin: Point::default(),
            zoom_value: 1.0,
        }
    }
}

impl Viewport {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            scroll_origin: object.get("scrollOrigin").map(Point::coerce).unwrap_or_default(),
            zoom_value: object.get("zoomValue").map_or(1.0, coerce_number),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::json!({
            "scrollOrigin": self.scroll_origin.serialize(),
            "zoomValue": self.zoom_value,
        })
    }
}

/// View state of `user.json`
///
/// Unlike the other entries this object has no discriminator: its keys are
/// object IDs of pages (viewports) plus `document`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserState {
    pub page_list_height: f64,
    pub viewports: BTreeMap<ObjectId, Viewport>,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            page_list_height: DEFAULT_PAGE_LIST_HEIGHT,
            viewports: BTreeMap::new(),
        }
    }
}

impl UserState {
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut state = Self::default();
        for (key, entry) in object {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            if key == USER_DOCUMENT_KEY {
                if let Some(height) = entry.get("pageListHeight") {
                    state.page_list_height = coerce_number(height);
                }
            } else if entry.contains_key("scrollOrigin") || entry.contains_key("zoomValue") {
                state
                    .viewports
                    .insert(ObjectId::from(key.as_str()), Viewport::from_object(entry));
            }
        }
        state
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            USER_DOCUMENT_KEY.to_string(),
            serde_json::json!({ "pageListHeight": self.page_list_height }),
        );
        for (id, viewport) in &self.viewports {
            object.insert(id.to_string(), viewport.to_value());
        }
        Value::Object(object)
    }

    /// Remembered viewport of a page, if any
    pub fn viewport(&self, page: &ObjectId) -> Option<&Viewport> {
        self.viewports.get(page)
    }
}
