//! Arena Layer Tree
//!
//! A page's layers, stored in one arena. Every layer gets a [`LayerId`]
//! handle; the slot holding it records the ordered child handles and the
//! handle of its container. The parent link is a plain index, so it never
//! keeps anything alive: dropping the tree drops every layer at once.
//!
//! Order is significant. The order of [`LayerTree::children`] is the
//! z-order on screen and the order of the `layers` array on the wire.
//!
//! Slots of removed layers are not reused, so a stale handle can never
//! alias a newer layer; it simply stops resolving.
//!
//! # Examples
//!
//! ```rust
//! use sketchapp_core::models::{LayerFilter, LayerTree};
//! use serde_json::json;
//!
//! let tree = LayerTree::decode(&json!([
//!     {"_class": "artboard", "name": "Board", "layers": [
//!         {"_class": "bitmap", "name": "Photo"}
//!     ]}
//! ]))?;
//!
//! let board = tree.children(None)[0];
//! let photo = tree.children(Some(board))[0];
//! assert_eq!(tree.parent(photo), Some(board));
//! assert_eq!(tree.find(None, &LayerFilter::new().with_class("bitmap")), vec![photo]);
//! # Ok::<(), sketchapp_core::models::SchemaError>(())
//! ```

use crate::models::coerce::ObjectId;
use crate::models::layer::Layer;
use crate::models::query::LayerFilter;
use crate::models::schema::SchemaError;
use serde_json::Value;
use std::fmt;

/// Key of the child array inside a container object
pub const LAYERS_KEY: &str = "layers";

/// Handle to one layer of a [`LayerTree`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u32);

impl LayerId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct LayerSlot {
    layer: Layer,
    parent: Option<LayerId>,
    children: Vec<LayerId>,
}

/// Ordered, owned forest of layers with upward links
#[derive(Debug, Clone, Default)]
pub struct LayerTree {
    slots: Vec<Option<LayerSlot>>,
    roots: Vec<LayerId>,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from a `layers` array
    ///
    /// Anything but an array yields an empty tree. Children are read only
    /// from containers; a `layers` key on a leaf is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownLayerType` for the first element, at any
    /// depth, whose discriminator is not dispatchable. No partial tree is
    /// returned.
    pub fn decode(value: &Value) -> Result<Self, SchemaError> {
        let mut tree = Self::new();
        if let Some(elements) = value.as_array() {
            tree.decode_children(None, elements)?;
        }
        Ok(tree)
    }

    fn decode_children(
        &mut self,
        parent: Option<LayerId>,
        elements: &[Value],
    ) -> Result<(), SchemaError> {
        for element in elements {
            let layer = Layer::decode(element)?;
            let is_container = layer.is_container();
            let id = self.attach(parent, usize::MAX, layer);

            match element.get(LAYERS_KEY).and_then(Value::as_array) {
                Some(children) if is_container => self.decode_children(Some(id), children)?,
                Some(children) if !children.is_empty() => {
                    tracing::debug!(
                        "Ignoring {} children of leaf layer {}",
                        children.len(),
                        self.slots[id.idx()].as_ref().map_or("", |s| s.layer.class())
                    );
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Encode the root layers, each container with its `layers` array
    pub fn to_values(&self) -> Vec<Value> {
        self.roots.iter().map(|&id| self.encode_layer(id)).collect()
    }

    fn encode_layer(&self, id: LayerId) -> Value {
        let Some(slot) = self.slot(id) else {
            return Value::Null;
        };
        let mut object = slot.layer.to_object();
        if slot.layer.is_container() {
            let children = slot.children.iter().map(|&child| self.encode_layer(child)).collect();
            object.insert(LAYERS_KEY.to_string(), Value::Array(children));
        }
        Value::Object(object)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    fn slot(&self, id: LayerId) -> Option<&LayerSlot> {
        self.slots.get(id.idx()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: LayerId) -> Option<&mut LayerSlot> {
        self.slots.get_mut(id.idx()).and_then(Option::as_mut)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.slot(id).map(|slot| &slot.layer)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.slot_mut(id).map(|slot| &mut slot.layer)
    }

    /// Whether `id` refers to a live layer of this tree
    pub fn contains(&self, id: LayerId) -> bool {
        self.slot(id).is_some()
    }

    /// Number of live layers at every depth
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Container of `id`, or `None` for a root layer or a stale handle
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    /// Ordered children of `parent`; `None` addresses the root level
    pub fn children(&self, parent: Option<LayerId>) -> &[LayerId] {
        match parent {
            None => &self.roots,
            Some(id) => self.slot(id).map_or(&[], |slot| slot.children.as_slice()),
        }
    }

    /// Containers of `id`, nearest first
    pub fn ancestors(&self, id: LayerId) -> Vec<LayerId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = self.parent(ancestor);
        }
        ancestors
    }

    /// Top-level layer whose subtree holds `id`
    pub fn root_of(&self, id: LayerId) -> Option<LayerId> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).last().copied().unwrap_or(id))
    }

    /// First layer, in document order, carrying `object_id`
    pub fn find_by_object_id(&self, object_id: &ObjectId) -> Option<LayerId> {
        self.depth_first(None)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|layer| layer.object_id() == object_id))
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Descendants of `start` in depth-first pre-order, `start` excluded
    ///
    /// `None` walks the whole tree.
    pub fn depth_first(&self, start: Option<LayerId>) -> Vec<LayerId> {
        let mut order = Vec::new();
        let mut stack: Vec<LayerId> = self.children(start).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(Some(id)).iter().rev().copied());
        }
        order
    }

    /// Descendants of `start` matching `filter`, in document order
    pub fn find(&self, start: Option<LayerId>, filter: &LayerFilter) -> Vec<LayerId> {
        self.depth_first(start)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|layer| filter.matches(layer)))
            .collect()
    }

    /// Every live layer in document order
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        self.depth_first(None)
            .into_iter()
            .filter_map(move |id| self.get(id).map(|layer| (id, layer)))
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Insert `layer` as child `index` of `parent` (clamped to the end)
    ///
    /// # Errors
    ///
    /// `LayerNotFound` for a stale parent handle, `NotAContainer` when the
    /// parent is a leaf.
    pub fn insert(
        &mut self,
        parent: Option<LayerId>,
        index: usize,
        layer: Layer,
    ) -> Result<LayerId, SchemaError> {
        self.check_container(parent)?;
        Ok(self.attach(parent, index, layer))
    }

    /// Append `layer` as the last (topmost) child of `parent`
    pub fn push(&mut self, parent: Option<LayerId>, layer: Layer) -> Result<LayerId, SchemaError> {
        self.insert(parent, usize::MAX, layer)
    }

    /// Remove `id` and its whole subtree, returning the layer itself
    pub fn remove(&mut self, id: LayerId) -> Result<Layer, SchemaError> {
        if !self.contains(id) {
            return Err(SchemaError::layer_not_found(id));
        }
        self.detach(id);

        let mut doomed = self.depth_first(Some(id));
        doomed.push(id);
        let mut removed = None;
        for victim in doomed {
            if let Some(slot) = self.slots.get_mut(victim.idx()).and_then(Option::take) {
                if victim == id {
                    removed = Some(slot.layer);
                }
            }
        }
        removed.ok_or_else(|| SchemaError::layer_not_found(id))
    }

    /// Re-parent `id` under `new_parent` at child position `index`
    ///
    /// # Errors
    ///
    /// `LayerNotFound` for stale handles, `NotAContainer` for a leaf target,
    /// `CycleDetected` when the target is `id` itself or one of its
    /// descendants.
    pub fn move_layer(
        &mut self,
        id: LayerId,
        new_parent: Option<LayerId>,
        index: usize,
    ) -> Result<(), SchemaError> {
        if !self.contains(id) {
            return Err(SchemaError::layer_not_found(id));
        }
        self.check_container(new_parent)?;
        if let Some(target) = new_parent {
            if target == id || self.ancestors(target).contains(&id) {
                return Err(SchemaError::cycle_detected(id));
            }
        }

        self.detach(id);
        self.link(new_parent, index, id);
        Ok(())
    }

    fn check_container(&self, parent: Option<LayerId>) -> Result<(), SchemaError> {
        let Some(parent) = parent else {
            return Ok(());
        };
        let layer = self.get(parent).ok_or_else(|| SchemaError::layer_not_found(parent))?;
        if !layer.is_container() {
            return Err(SchemaError::not_a_container(layer.class()));
        }
        Ok(())
    }

    fn attach(&mut self, parent: Option<LayerId>, index: usize, layer: Layer) -> LayerId {
        let id = LayerId(self.slots.len() as u32);
        self.slots.push(Some(LayerSlot {
            layer,
            parent: None,
            children: Vec::new(),
        }));
        self.link(parent, index, id);
        id
    }

    fn link(&mut self, parent: Option<LayerId>, index: usize, id: LayerId) {
        let siblings = match parent {
            None => &mut self.roots,
            Some(parent_id) => match self.slots.get_mut(parent_id.idx()).and_then(Option::as_mut) {
                Some(slot) => &mut slot.children,
                None => return,
            },
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = parent;
        }
    }

    fn detach(&mut self, id: LayerId) {
        let parent = self.parent(id);
        let siblings = match parent {
            None => &mut self.roots,
            Some(parent_id) => match self.slots.get_mut(parent_id.idx()).and_then(Option::as_mut) {
                Some(slot) => &mut slot.children,
                None => return,
            },
        };
        siblings.retain(|&sibling| sibling != id);
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = None;
        }
    }

    fn same_subtrees(&self, ours: &[LayerId], other: &Self, theirs: &[LayerId]) -> bool {
        ours.len() == theirs.len()
            && ours.iter().zip(theirs).all(|(&a, &b)| {
                match (self.slot(a), other.slot(b)) {
                    (Some(left), Some(right)) => {
                        left.layer == right.layer
                            && self.same_subtrees(&left.children, other, &right.children)
                    }
                    _ => false,
                }
            })
    }
}

/// Structural equality: same layers in the same shape, whatever the handles
impl PartialEq for LayerTree {
    fn eq(&self, other: &Self) -> bool {
        self.same_subtrees(&self.roots, other, &other.roots)
    }
}

#[cfg(test)]
#[path = "layer_tree_test.rs"]
mod layer_tree_test;
