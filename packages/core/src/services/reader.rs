//! Archive Reader
//!
//! Opens a `.sketch` archive and assembles a [`SketchFile`]:
//!
//! 1. `document.json` is required; `user.json` and `meta.json` are optional.
//! 2. Every `pages/*.json` entry becomes a [`Page`], keyed by the page's own
//!    object ID rather than by its entry name.
//! 3. Every bitmap layer's image entry is copied to the sidecar directory,
//!    named after the layer. A missing entry is recorded on the result as an
//!    [`UnresolvedAsset`] and logged; it does not fail the read.
//! 4. `previews/*` entries are copied to the sidecar directory.
//!
//! An unknown layer type anywhere fails the whole read.

use crate::models::{
    Bitmap, DocumentNode, MetaNode, ObjectId, Page, SchemaNode, SketchConfig, SketchFile,
    UnresolvedAsset, UserState,
};
use crate::services::error::SketchError;
use crate::services::sidecar::{SidecarDir, PREVIEWS_PREFIX};
use crate::services::{DOCUMENT_ENTRY, META_ENTRY, PAGES_PREFIX, SKETCH_EXTENSION, USER_ENTRY};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Extension tried after the exact reference of an image entry
const FALLBACK_IMAGE_EXTENSION: &str = ".png";

/// Reads `.sketch` archives into [`SketchFile`]s
#[derive(Debug, Clone, Default)]
pub struct SketchReader {
    config: SketchConfig,
}

impl SketchReader {
    pub fn new(config: SketchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Read the archive at `path`, extracting images next to it
    ///
    /// # Errors
    ///
    /// - `NotASketchFile` when the extension is not `.sketch`
    /// - `CorruptArchive` when the zip container cannot be opened
    /// - `MissingDocumentEntry` when `document.json` is absent
    /// - `InvalidJson` for an entry that does not parse
    /// - `Schema` for an unknown layer type in any page
    /// - `Io` when the sidecar directory cannot be written
    pub fn read(&self, path: impl AsRef<Path>) -> Result<SketchFile, SketchError> {
        let path = path.as_ref();
        if !has_sketch_extension(path) {
            return Err(SketchError::not_a_sketch_file(path));
        }

        let archive_file = File::open(path)?;
        let mut archive =
            ZipArchive::new(archive_file).map_err(|e| SketchError::corrupt_archive(path, e))?;
        let entry_names: Vec<String> = archive.file_names().map(String::from).collect();
        tracing::info!("Reading {} ({} entries)", path.display(), entry_names.len());

        let document = read_json(&mut archive, DOCUMENT_ENTRY)?
            .ok_or_else(|| SketchError::missing_document_entry(path))?;

        let mut file = SketchFile::with_id_source(self.config.id_source.clone());
        file.document = DocumentNode::from_value(&document);

        if let Some(user) = read_json(&mut archive, USER_ENTRY)? {
            file.user = UserState::from_value(&user);
        }
        if let Some(meta) = read_json(&mut archive, META_ENTRY)? {
            file.meta = MetaNode::from_value(&meta);
        }

        for name in entry_names.iter().filter(|name| is_page_entry(name)) {
            let Some(value) = read_json(&mut archive, name)? else {
                continue;
            };
            let page = Page::from_value(&value)?;
            let id = page_key(&page, name);
            tracing::debug!("Decoded page entry {} as {} ({})", name, id, page);
            if file.pages.insert(id.clone(), page).is_some() {
                tracing::warn!("Duplicate page ID {} in {}, keeping the last page", id, name);
            }
        }

        let sidecar = SidecarDir::for_archive(path, &self.config);
        file.set_images_dir(sidecar.path());
        let extracted = self.extract_images(&mut archive, &sidecar, &mut file)?;

        if self.config.extract_previews {
            for name in entry_names.iter().filter(|name| is_preview_entry(name)) {
                let Some(target) = sidecar.preview_path(name) else {
                    tracing::warn!("Skipping preview entry {} without a file name", name);
                    continue;
                };
                let Some(bytes) = read_entry(&mut archive, name)? else {
                    continue;
                };
                self.write_sidecar(&sidecar, &target, &bytes, false)?;
                file.previews.push(name.clone());
            }
        }

        tracing::info!(
            "Read {}: {} pages, {} images, {} previews, {} unresolved",
            path.display(),
            file.pages.len(),
            extracted,
            file.previews.len(),
            file.unresolved_assets().len()
        );
        Ok(file)
    }

    /// Copy every bitmap's image entry to the sidecar directory
    fn extract_images<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        sidecar: &SidecarDir,
        file: &mut SketchFile,
    ) -> Result<usize, SketchError> {
        let wanted: Vec<(ObjectId, String, String, PathBuf)> = file
            .bitmaps()
            .into_iter()
            .map(|bitmap: &Bitmap| {
                (
                    bitmap.object_id.clone(),
                    bitmap.name.clone(),
                    bitmap.image.reference.clone(),
                    sidecar.image_path(bitmap),
                )
            })
            .collect();

        // Targets claimed by a bitmap of this read, and those this read wrote
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();
        let mut written: HashSet<PathBuf> = HashSet::new();
        for (layer_id, layer_name, reference, target) in wanted {
            if let Some(previous) = claimed.get(&target) {
                if *previous == reference {
                    continue;
                }
                tracing::warn!(
                    "Bitmaps '{}' and '{}' share sidecar {}, keeping the last one",
                    previous,
                    reference,
                    target.display()
                );
            }

            let Some(bytes) = read_image(archive, &reference)? else {
                tracing::warn!(
                    "Bitmap '{}' ({}) references missing entry '{}'",
                    layer_name,
                    layer_id,
                    reference
                );
                file.record_unresolved(UnresolvedAsset {
                    layer_id,
                    layer_name,
                    reference,
                });
                continue;
            };

            let ours = written.contains(&target);
            if self.write_sidecar(sidecar, &target, &bytes, ours)? {
                written.insert(target.clone());
            }
            claimed.insert(target, reference);
        }
        Ok(claimed.len())
    }

    /// Write one sidecar file, honoring the overwrite policy
    ///
    /// `replace` marks a file written earlier by the same read, which is
    /// always replaced. Returns whether the file was written.
    fn write_sidecar(
        &self,
        sidecar: &SidecarDir,
        target: &Path,
        bytes: &[u8],
        replace: bool,
    ) -> Result<bool, SketchError> {
        if target.exists() && !replace && !self.config.overwrite_images {
            tracing::debug!("Keeping existing sidecar {}", target.display());
            return Ok(false);
        }
        sidecar.ensure()?;
        std::fs::write(target, bytes)?;
        tracing::debug!("Wrote sidecar {} ({} bytes)", target.display(), bytes.len());
        Ok(true)
    }
}

/// Read the archive at `path` with the default configuration
pub fn read_document(path: impl AsRef<Path>) -> Result<SketchFile, SketchError> {
    SketchReader::default().read(path)
}

fn has_sketch_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SKETCH_EXTENSION))
}

fn is_page_entry(name: &str) -> bool {
    name.starts_with(PAGES_PREFIX) && name.ends_with(".json")
}

fn is_preview_entry(name: &str) -> bool {
    name.starts_with(PREVIEWS_PREFIX) && !name.ends_with('/')
}

/// Map key of a page: its object ID, or the entry's file stem when it has none
fn page_key(page: &Page, entry: &str) -> ObjectId {
    if !page.object_id().is_empty() {
        return page.object_id().clone();
    }
    let stem = entry
        .strip_prefix(PAGES_PREFIX)
        .and_then(|name| name.strip_suffix(".json"))
        .unwrap_or(entry);
    tracing::warn!("Page entry {} has no object ID, keying it by file name", entry);
    ObjectId::from(stem)
}

/// Raw bytes of an entry, or `None` when the archive has no such entry
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, SketchError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    tracing::debug!("Read entry {} ({} bytes)", name, bytes.len());
    Ok(Some(bytes))
}

fn read_json<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Value>, SketchError> {
    match read_entry(archive, name)? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SketchError::invalid_json(name, e)),
        None => Ok(None),
    }
}

/// Image bytes for a bitmap reference, trying the exact entry then `.png`
fn read_image<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    reference: &str,
) -> Result<Option<Vec<u8>>, SketchError> {
    if reference.is_empty() {
        return Ok(None);
    }
    if let Some(bytes) = read_entry(archive, reference)? {
        return Ok(Some(bytes));
    }
    if reference.ends_with(FALLBACK_IMAGE_EXTENSION) {
        return Ok(None);
    }
    read_entry(archive, &format!("{}{}", reference, FALLBACK_IMAGE_EXTENSION))
}
