//! Tree Query Filters
//!
//! A [`LayerFilter`] selects layers by discriminator, exact name and name
//! substring. Filters combine conjunctively; an unset filter matches
//! everything. Traversal lives on [`LayerTree::find`](crate::models::LayerTree::find)
//! and walks depth-first in document order, so the first result is the
//! "first match" callers select.
//!
//! # Examples
//!
//! ```rust
//! use sketchapp_core::models::LayerFilter;
//!
//! // All bitmaps
//! let filter = LayerFilter::new().with_class("bitmap");
//!
//! // Layers whose name contains "board"
//! let filter = LayerFilter::new().with_pattern("board");
//! ```

use crate::models::layer::Layer;
use serde::{Deserialize, Serialize};

/// Conjunctive layer selection criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerFilter {
    /// Filter by discriminator (`_class`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Filter by exact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Filter by name substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl LayerFilter {
    /// Create a new empty filter, matching every layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by discriminator
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Filter by exact name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by name substring
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Whether `layer` satisfies every filter that is set
    pub fn matches(&self, layer: &Layer) -> bool {
        self.class.as_deref().map_or(true, |class| layer.class() == class)
            && self.name.as_deref().map_or(true, |name| layer.name() == name)
            && self
                .pattern
                .as_deref()
                .map_or(true, |pattern| layer.name().contains(pattern))
    }
}
