//! Object ID Generation
//!
//! Editing operations mint IDs through an [`ObjectIdGenerator`] owned by the
//! document being edited, never through process-wide state.

use crate::models::{IdSource, Layer, ObjectId};
use uuid::Uuid;

/// Mints fresh object IDs for new layers and pages
#[derive(Debug, Clone, Default)]
pub struct ObjectIdGenerator {
    source: IdSource,
    issued: u64,
}

impl ObjectIdGenerator {
    pub fn new(source: IdSource) -> Self {
        Self { source, issued: 0 }
    }

    /// Shorthand for a sequential generator
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self::new(IdSource::Sequential {
            prefix: prefix.into(),
        })
    }

    pub fn next_id(&mut self) -> ObjectId {
        self.issued += 1;
        match &self.source {
            IdSource::Uuid => ObjectId::new(Uuid::new_v4().to_string().to_uppercase()),
            IdSource::Sequential { prefix } => ObjectId::new(format!("{}{}", prefix, self.issued)),
        }
    }

    /// Give `layer` a fresh ID if it has none; returns the layer's ID
    pub fn assign(&mut self, layer: &mut Layer) -> ObjectId {
        if layer.object_id().is_empty() {
            let id = self.next_id();
            tracing::trace!("Assigned object ID {} to {}", id, layer);
            layer.set_object_id(id);
        }
        layer.object_id().clone()
    }

    /// Number of IDs minted so far
    pub fn issued(&self) -> u64 {
        self.issued
    }
}
