//! Archive Services
//!
//! The I/O half of the crate:
//!
//! - `SketchReader` - archive to [`SketchFile`](crate::models::SketchFile), extracting images
//! - `SketchWriter` - [`SketchFile`](crate::models::SketchFile) back to an archive
//! - `SidecarDir` - where extracted images and previews live on disk
//! - `ObjectIdGenerator` - fresh object IDs for editing
//!
//! Archive layout shared by reader and writer:
//!
//! | Entry | Content |
//! |---|---|
//! | `document.json` | document settings and page references |
//! | `user.json` | view state |
//! | `meta.json` | writer application info |
//! | `pages/<objectId>.json` | one page and its layers |
//! | `images/<ref>` | bitmap bytes, at the bitmap's stored reference |
//! | `previews/<name>` | preview images |

pub mod error;
pub mod id_generator;
pub mod reader;
pub mod sidecar;
pub mod writer;

pub use error::SketchError;
pub use id_generator::ObjectIdGenerator;
pub use reader::{read_document, SketchReader};
pub use sidecar::SidecarDir;
pub use writer::{write_document, SketchWriter};

/// File extension of archives, without the dot
pub const SKETCH_EXTENSION: &str = "sketch";

pub const DOCUMENT_ENTRY: &str = "document.json";
pub const USER_ENTRY: &str = "user.json";
pub const META_ENTRY: &str = "meta.json";

/// Archive path prefix of page entries
pub const PAGES_PREFIX: &str = "pages/";
