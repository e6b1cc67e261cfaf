//! Codec Configuration

use serde::{Deserialize, Serialize};

/// Default extension appended to sidecar image names
pub const DEFAULT_IMAGE_EXTENSION: &str = "png";

/// Default suffix of the sidecar directory next to an archive
pub const DEFAULT_IMAGES_DIR_SUFFIX: &str = "_images";

/// Where fresh object IDs come from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdSource {
    /// Upper-case UUID v4, the form the design tool writes
    #[default]
    Uuid,
    /// `<prefix><n>` with `n` counting up from 1, for reproducible output
    Sequential { prefix: String },
}

/// Configuration for reading and writing archives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SketchConfig {
    /// Replace sidecar images that already exist on read (default: false)
    pub overwrite_images: bool,
    /// Extension of sidecar image files, without the dot (default: "png")
    pub image_extension: String,
    /// Suffix appended to the archive's base name for the sidecar directory (default: "_images")
    pub images_dir_suffix: String,
    /// Copy `previews/` entries to the sidecar directory on read (default: true)
    pub extract_previews: bool,
    /// Source of object IDs minted while editing (default: UUID)
    pub id_source: IdSource,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            overwrite_images: false,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            images_dir_suffix: DEFAULT_IMAGES_DIR_SUFFIX.to_string(),
            extract_previews: true,
            id_source: IdSource::Uuid,
        }
    }
}
