//! Archive Writer
//!
//! The inverse of the reader. Entries are written to a staging file in the
//! target directory, which replaces the target only once every entry has
//! been added. Missing sidecar images are detected before staging starts,
//! so a failed write leaves any existing archive untouched.

use crate::models::{SchemaNode, SketchConfig, SketchFile};
use crate::services::error::SketchError;
use crate::services::sidecar::SidecarDir;
use crate::services::{DOCUMENT_ENTRY, META_ENTRY, PAGES_PREFIX, USER_ENTRY};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes [`SketchFile`]s to `.sketch` archives
#[derive(Debug, Clone, Default)]
pub struct SketchWriter {
    config: SketchConfig,
}

impl SketchWriter {
    pub fn new(config: SketchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// Write `file` to `path`
    ///
    /// Images are taken from the file's sidecar directory (the one it was
    /// read with), or from the directory derived from `path` for documents
    /// built in memory.
    ///
    /// # Errors
    ///
    /// - `MissingSidecar` when a bitmap's image file does not exist
    /// - `Io` / `Zip` when staging or persisting the archive fails
    pub fn write(&self, path: impl AsRef<Path>, file: &SketchFile) -> Result<(), SketchError> {
        let path = path.as_ref();
        let sidecar = match file.images_dir() {
            Some(dir) => SidecarDir::at(dir, &self.config),
            None => SidecarDir::for_archive(path, &self.config),
        };
        tracing::info!("Writing {} ({} pages)", path.display(), file.pages.len());

        let images = self.collect_images(file, &sidecar)?;
        let previews: Vec<(&str, PathBuf)> = file
            .previews
            .iter()
            .filter_map(|name| Some((name.as_str(), sidecar.preview_path(name)?)))
            .filter(|(name, source)| {
                let present = source.exists();
                if !present {
                    tracing::debug!("Skipping preview {}: no sidecar file", name);
                }
                present
            })
            .collect();

        let target_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut staging = NamedTempFile::new_in(target_dir)?;
        {
            let mut zip = ZipWriter::new(staging.as_file_mut());
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            let document = file.document.to_value().unwrap_or_else(|| Value::Object(Map::new()));
            write_json(&mut zip, DOCUMENT_ENTRY, &document, options)?;
            write_json(&mut zip, USER_ENTRY, &file.user.to_value(), options)?;
            let meta = file.meta.to_value().unwrap_or_else(|| Value::Object(Map::new()));
            write_json(&mut zip, META_ENTRY, &meta, options)?;

            for (id, page) in &file.pages {
                let entry = format!("{}{}.json", PAGES_PREFIX, id);
                write_json(&mut zip, &entry, &page.to_value(), options)?;
            }
            for (entry, source) in &images {
                copy_file(&mut zip, entry, source, options)?;
            }
            for (entry, source) in &previews {
                copy_file(&mut zip, entry, source, options)?;
            }
            zip.finish()?;
        }

        staging
            .persist(path)
            .map_err(|e| SketchError::Io(e.error))?;
        tracing::info!(
            "Wrote {}: {} pages, {} images, {} previews",
            path.display(),
            file.pages.len(),
            images.len(),
            previews.len()
        );
        Ok(())
    }

    /// Image entries keyed by reference, each sourced from its sidecar file
    ///
    /// Bitmaps sharing a reference produce one entry, from the first bitmap.
    fn collect_images(
        &self,
        file: &SketchFile,
        sidecar: &SidecarDir,
    ) -> Result<BTreeMap<String, PathBuf>, SketchError> {
        let mut images = BTreeMap::new();
        for bitmap in file.bitmaps() {
            let reference = &bitmap.image.reference;
            if reference.is_empty() {
                tracing::warn!("Bitmap '{}' has no image reference, skipping", bitmap.name);
                continue;
            }
            if images.contains_key(reference) {
                continue;
            }
            let source = sidecar.image_path(bitmap);
            if !source.is_file() {
                return Err(SketchError::missing_sidecar(&bitmap.name, source));
            }
            images.insert(reference.clone(), source);
        }
        Ok(images)
    }
}

/// Write `file` to `path` with the default configuration
pub fn write_document(path: impl AsRef<Path>, file: &SketchFile) -> Result<(), SketchError> {
    SketchWriter::default().write(path, file)
}

fn write_json<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    value: &Value,
    options: FileOptions,
) -> Result<(), SketchError> {
    let bytes = serde_json::to_vec(value).map_err(|e| SketchError::invalid_json(entry, e))?;
    zip.start_file(entry, options)?;
    zip.write_all(&bytes)?;
    tracing::debug!("Added entry {} ({} bytes)", entry, bytes.len());
    Ok(())
}

fn copy_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    source: &Path,
    options: FileOptions,
) -> Result<(), SketchError> {
    let mut input = File::open(source)?;
    zip.start_file(entry, options)?;
    let copied = std::io::copy(&mut input, zip)?;
    tracing::debug!("Added entry {} from {} ({} bytes)", entry, source.display(), copied);
    Ok(())
}
