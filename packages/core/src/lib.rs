//! SketchApp Document Codec
//!
//! This crate reads `.sketch` archives (zip containers of JSON entries) into
//! a typed in-memory object graph, lets a host application query and edit
//! it, and writes it back.
//!
//! # Architecture
//!
//! - **Schema-as-table**: every JSON object type is declared with a static
//!   field table (`schema_node!`); absent fields get typed defaults, unknown
//!   fields are dropped, and encoding emits exactly the declared fields
//! - **Lossy scalars, strict structure**: a malformed scalar falls back to
//!   its type's default, an unknown layer type fails the read
//! - **Arena layer trees**: each page owns its layers in a `LayerTree`;
//!   parent links are indices, never owning pointers
//! - **Sidecar images**: bitmap payloads are extracted next to the archive
//!   on read and packed back from there on write
//!
//! # Modules
//!
//! - [`models`] - Data structures (layers, pages, document, queries)
//! - [`services`] - Archive reader and writer, sidecar handling, errors
//!
//! # Examples
//!
//! ```rust,no_run
//! use sketchapp_core::{read_document, write_document, LayerFilter};
//!
//! let mut file = read_document("Poster.sketch")?;
//! for layer_ref in file.find(&LayerFilter::new().with_class("artboard").with_pattern("Draft")) {
//!     if let Some(layer) = file.layer_mut(&layer_ref) {
//!         layer.set_name("Final");
//!     }
//! }
//! write_document("Poster.sketch", &file)?;
//! # Ok::<(), sketchapp_core::SketchError>(())
//! ```
//!
//! Renaming a bitmap changes the sidecar file its image is read from on
//! write; rename the image in the sidecar directory along with it.

pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
