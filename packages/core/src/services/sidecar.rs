//! Sidecar Image Directory
//!
//! Bitmap payloads and previews live outside the archive, in a directory
//! next to it: `<archiveDir>/<archiveBaseName><suffix>/`. Bitmaps are stored
//! under the layer's name plus the configured extension, previews under the
//! file name of their archive entry.

use crate::models::{Bitmap, SketchConfig};
use std::io;
use std::path::{Path, PathBuf};

/// Archive path prefix of preview entries
pub const PREVIEWS_PREFIX: &str = "previews/";

/// Resolved sidecar directory of one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarDir {
    root: PathBuf,
    image_extension: String,
}

impl SidecarDir {
    /// Sidecar directory for the archive at `archive`
    pub fn for_archive(archive: &Path, config: &SketchConfig) -> Self {
        let base = archive
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = archive.parent().unwrap_or_else(|| Path::new(""));
        Self {
            root: parent.join(format!("{}{}", base, config.images_dir_suffix)),
            image_extension: config.image_extension.clone(),
        }
    }

    /// Use an explicit directory instead of the one derived from an archive
    pub fn at(root: impl Into<PathBuf>, config: &SketchConfig) -> Self {
        Self {
            root: root.into(),
            image_extension: config.image_extension.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if absent
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// File name of a bitmap's sidecar image
    ///
    /// Path separators in the layer name are replaced; a nameless layer
    /// falls back to its object ID.
    pub fn image_file_name(&self, bitmap: &Bitmap) -> String {
        let stem = if bitmap.name.is_empty() {
            bitmap.object_id.as_str()
        } else {
            bitmap.name.as_str()
        };
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}.{}", stem, self.image_extension)
    }

    pub fn image_path(&self, bitmap: &Bitmap) -> PathBuf {
        self.root.join(self.image_file_name(bitmap))
    }

    /// Sidecar location of a `previews/<name>` entry
    ///
    /// `None` when the entry path has no final file name (`previews/..`).
    pub fn preview_path(&self, entry: &str) -> Option<PathBuf> {
        let name = entry.strip_prefix(PREVIEWS_PREFIX).unwrap_or(entry);
        let name = Path::new(name).file_name()?;
        Some(self.root.join(name))
    }
}
