//! Assembled Document
//!
//! [`SketchFile`] is the in-memory form of one archive: the document,
//! user and meta entries, the pages keyed by their own object ID, and the
//! bookkeeping the reader and writer share (sidecar directory, preview
//! entries, unresolved assets). It also owns the [`ObjectIdGenerator`]
//! used when editing.

use crate::models::assets::FileReference;
use crate::models::coerce::ObjectId;
use crate::models::config::IdSource;
use crate::models::document::{DocumentNode, MetaNode, UserState};
use crate::models::layer::{Bitmap, Layer};
use crate::models::layer_tree::LayerId;
use crate::models::page::Page;
use crate::models::query::LayerFilter;
use crate::models::schema::SchemaNode;
use crate::services::id_generator::ObjectIdGenerator;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A bitmap whose image entry was absent from the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAsset {
    pub layer_id: ObjectId,
    pub layer_name: String,
    pub reference: String,
}

impl fmt::Display for UnresolvedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bitmap '{}' ({}) references missing entry '{}'",
            self.layer_name, self.layer_id, self.reference
        )
    }
}

/// Handle to one layer of a document: its page and its place in that page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerRef {
    pub page: ObjectId,
    pub layer: LayerId,
}

/// In-memory form of a `.sketch` archive
#[derive(Debug, Clone, Default)]
pub struct SketchFile {
    pub document: DocumentNode,
    pub user: UserState,
    pub meta: MetaNode,
    /// Pages keyed by their own `do_objectID`
    pub pages: BTreeMap<ObjectId, Page>,
    /// Names of the `previews/` entries found on read
    pub previews: Vec<String>,
    images_dir: Option<PathBuf>,
    unresolved_assets: Vec<UnresolvedAsset>,
    ids: ObjectIdGenerator,
}

impl SketchFile {
    /// Empty document minting UUID object IDs
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document minting object IDs from `source`
    pub fn with_id_source(source: IdSource) -> Self {
        Self {
            ids: ObjectIdGenerator::new(source),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    pub fn page(&self, id: &ObjectId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn page_mut(&mut self, id: &ObjectId) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// Pages in display order
    ///
    /// Pages referenced by the document come first, in reference order;
    /// pages it does not reference follow in object ID order.
    pub fn ordered_pages(&self) -> Vec<&Page> {
        let referenced = self.document.page_order();
        let mut ordered: Vec<&Page> = Vec::with_capacity(self.pages.len());
        for id in &referenced {
            if let Some(page) = self.pages.get(id) {
                if !ordered.iter().any(|seen| seen.object_id() == id) {
                    ordered.push(page);
                }
            }
        }
        for (id, page) in &self.pages {
            if !referenced.contains(id) {
                ordered.push(page);
            }
        }
        ordered
    }

    /// Page at `index` of [`SketchFile::ordered_pages`]
    pub fn page_at(&self, index: usize) -> Option<&Page> {
        self.ordered_pages().into_iter().nth(index)
    }

    /// Page selected by the document's `currentPageIndex`
    pub fn current_page(&self) -> Option<&Page> {
        let index = usize::try_from(self.document.current_page_index).ok()?;
        self.page_at(index)
    }

    /// Create an empty page, reference it from the document and return its ID
    pub fn add_page(&mut self, name: impl Into<String>) -> ObjectId {
        let page = Page::new(name, &mut self.ids);
        self.insert_page(page)
    }

    /// Add a page, minting an object ID if it has none
    ///
    /// A page with the ID of an existing one replaces it.
    pub fn insert_page(&mut self, mut page: Page) -> ObjectId {
        if page.object_id().is_empty() {
            page.node.object_id = self.ids.next_id();
        }
        let id = page.object_id().clone();

        if !self.document.page_order().contains(&id) {
            self.document.pages.push(FileReference::page(&id));
        }
        if self.pages.insert(id.clone(), page).is_some() {
            tracing::warn!("Duplicate page ID {}, keeping the last page", id);
        }
        id
    }

    /// Remove a page and its document reference
    pub fn remove_page(&mut self, id: &ObjectId) -> Option<Page> {
        self.document
            .pages
            .retain(|reference| reference.page_id().as_ref() != Some(id));
        self.pages.remove(id)
    }

    /// A page together with the ID generator, for editing its layers
    pub fn edit_page(&mut self, id: &ObjectId) -> Option<(&mut Page, &mut ObjectIdGenerator)> {
        let page = self.pages.get_mut(id)?;
        Some((page, &mut self.ids))
    }

    pub fn ids_mut(&mut self) -> &mut ObjectIdGenerator {
        &mut self.ids
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Matching layers of every page, pages in display order
    pub fn find(&self, filter: &LayerFilter) -> Vec<LayerRef> {
        self.ordered_pages()
            .into_iter()
            .flat_map(|page| {
                page.find(filter).into_iter().map(move |layer| LayerRef {
                    page: page.object_id().clone(),
                    layer,
                })
            })
            .collect()
    }

    /// Resolve a handle returned by [`SketchFile::find`]
    pub fn layer(&self, layer_ref: &LayerRef) -> Option<&Layer> {
        self.pages.get(&layer_ref.page)?.layers.get(layer_ref.layer)
    }

    pub fn layer_mut(&mut self, layer_ref: &LayerRef) -> Option<&mut Layer> {
        self.pages.get_mut(&layer_ref.page)?.layers.get_mut(layer_ref.layer)
    }

    /// Every bitmap layer, pages in display order
    pub fn bitmaps(&self) -> Vec<&Bitmap> {
        self.find(&LayerFilter::new().with_class(Bitmap::CLASS))
            .iter()
            .filter_map(|layer_ref| self.layer(layer_ref))
            .filter_map(Layer::as_bitmap)
            .collect()
    }

    // ------------------------------------------------------------------
    // Reader/writer bookkeeping
    // ------------------------------------------------------------------

    /// Sidecar directory the images were extracted to, if read from disk
    pub fn images_dir(&self) -> Option<&Path> {
        self.images_dir.as_deref()
    }

    pub fn set_images_dir(&mut self, dir: impl Into<PathBuf>) {
        self.images_dir = Some(dir.into());
    }

    /// Bitmaps whose image entry was missing on read
    pub fn unresolved_assets(&self) -> &[UnresolvedAsset] {
        &self.unresolved_assets
    }

    pub(crate) fn record_unresolved(&mut self, asset: UnresolvedAsset) {
        self.unresolved_assets.push(asset);
    }
}

impl fmt::Display for SketchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<sketchFile pages={}>", self.pages.len())
    }
}
