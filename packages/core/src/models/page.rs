//! Pages
//!
//! A page is the root container of one `pages/<id>.json` entry: its own
//! fields plus a [`LayerTree`] holding the artboards and loose layers.
//! Editing goes through the page so that new layers are given an object ID
//! by the document's [`ObjectIdGenerator`].

use crate::models::assets::{ExportOptions, RulerData};
use crate::models::coerce::{ObjectId, UnmodeledMap};
use crate::models::geometry::Rect;
use crate::models::layer::Layer;
use crate::models::layer_tree::{LayerId, LayerTree, LAYERS_KEY};
use crate::models::query::LayerFilter;
use crate::models::schema::{SchemaError, SchemaNode, CLASS_KEY};
use crate::models::style::Style;
use crate::schema_node;
use crate::services::id_generator::ObjectIdGenerator;
use serde_json::{Map, Value};
use std::fmt;

schema_node! {
    /// Fields of a page, without its layers
    pub struct PageNode("page") {
        "do_objectID" => object_id: ObjectId = null,
        "booleanOperation" => boolean_operation: i64 = (-1),
        "exportOptions" => export_options: ExportOptions = null,
        "frame" => frame: Rect = null,
        "hasClickThrough" => has_click_through: bool = true,
        "horizontalRulerData" => horizontal_ruler_data: RulerData = null,
        "includeInCloudUpload" => include_in_cloud_upload: bool = false,
        "isFlippedHorizontal" => is_flipped_horizontal: bool = false,
        "isFlippedVertical" => is_flipped_vertical: bool = false,
        "isLocked" => is_locked: bool = false,
        "isVisible" => is_visible: bool = true,
        "layerListExpandedType" => layer_list_expanded_type: i64 = 0,
        "name" => name: String = "Untitled",
        "nameIsFixed" => name_is_fixed: bool = false,
        "resizingType" => resizing_type: i64 = 0,
        "rotation" => rotation: f64 = 0,
        "shouldBreakMaskChain" => should_break_mask_chain: bool = false,
        "style" => style: Style = null,
        "verticalRulerData" => vertical_ruler_data: RulerData = null,
        "userInfo" => user_info: UnmodeledMap = {},
    }
}

/// A page and its layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub node: PageNode,
    pub layers: LayerTree,
}

impl Page {
    /// Empty page named `name` with a fresh object ID
    pub fn new(name: impl Into<String>, ids: &mut ObjectIdGenerator) -> Self {
        Self {
            node: PageNode {
                object_id: ids.next_id(),
                name: name.into(),
                ..PageNode::default()
            },
            layers: LayerTree::new(),
        }
    }

    /// Decode a page entry
    ///
    /// # Errors
    ///
    /// Propagates `SchemaError::UnknownLayerType` from anywhere in the layer
    /// tree.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);
        if let Some(class) = object.get(CLASS_KEY).and_then(Value::as_str) {
            if class != PageNode::CLASS {
                tracing::warn!("Page entry carries _class '{}', decoding as page", class);
            }
        }

        Ok(Self {
            node: PageNode::decode(object),
            layers: LayerTree::decode(object.get(LAYERS_KEY).unwrap_or(&Value::Null))?,
        })
    }

    /// Encode the page with its `layers` array
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        self.node.encode_fields(&mut object);
        object.insert(CLASS_KEY.to_string(), Value::String(PageNode::CLASS.to_string()));
        object.insert(LAYERS_KEY.to_string(), Value::Array(self.layers.to_values()));
        Value::Object(object)
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.node.object_id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Matching layers of the whole page, in document order
    pub fn find(&self, filter: &LayerFilter) -> Vec<LayerId> {
        self.layers.find(None, filter)
    }

    /// Like [`Page::find`], resolving handles to layers
    pub fn find_layers(&self, filter: &LayerFilter) -> Vec<&Layer> {
        self.find(filter)
            .into_iter()
            .filter_map(|id| self.layers.get(id))
            .collect()
    }

    /// Every bitmap layer, in document order
    pub fn bitmaps(&self) -> Vec<LayerId> {
        self.find(&LayerFilter::new().with_class(crate::models::layer::Bitmap::CLASS))
    }

    /// Add `layer` on top of `parent`'s children (`None` for the page itself)
    pub fn append_layer(
        &mut self,
        parent: Option<LayerId>,
        layer: Layer,
        ids: &mut ObjectIdGenerator,
    ) -> Result<LayerId, SchemaError> {
        self.insert_layer(parent, usize::MAX, layer, ids)
    }

    /// Add `layer` at child position `index` of `parent`
    pub fn insert_layer(
        &mut self,
        parent: Option<LayerId>,
        index: usize,
        mut layer: Layer,
        ids: &mut ObjectIdGenerator,
    ) -> Result<LayerId, SchemaError> {
        ids.assign(&mut layer);
        let id = self.layers.insert(parent, index, layer)?;
        tracing::debug!("Inserted layer {} into page '{}'", id, self.name());
        Ok(id)
    }

    /// Remove a layer and everything below it
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, SchemaError> {
        self.layers.remove(id)
    }

    /// Re-parent a layer within this page
    pub fn move_layer(
        &mut self,
        id: LayerId,
        new_parent: Option<LayerId>,
        index: usize,
    ) -> Result<(), SchemaError> {
        self.layers.move_layer(id, new_parent, index)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<page name={} layers={}>", self.name(), self.layers.len())
    }
}
