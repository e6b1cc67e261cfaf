//! Archive Round-Trip Tests
//!
//! Integration tests for reading and writing `.sketch` archives on disk.
//!
//! ## Archive Layout
//! - `document.json` (required), `user.json`, `meta.json`
//! - `pages/<objectId>.json`, one per page
//! - `images/<ref>` bitmap payloads, extracted to `<base>_images/<layer name>.png`
//! - `previews/<name>` preview images
//!
//! ## Test Coverage
//! - Full read of a one-page archive with sidecar extraction
//! - Write back and field-wise comparison of the re-read entries
//! - Fatal structural errors and non-fatal unresolved assets
//! - Sidecar overwrite policy and name collisions
//! - Atomic write when a sidecar image is missing

#[cfg(test)]
mod archive_roundtrip_tests {
    use anyhow::Result;
    use serde_json::{json, Value};
    use sketchapp_core::{
        read_document, write_document, Bitmap, DocumentNode, ImageReference, Layer, LayerFilter,
        ObjectId, Page, SchemaError, SchemaNode, SketchConfig, SketchError, SketchFile, SketchReader,
    };
    use std::fs::{self, File};
    use std::io::{Read, Write};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::{ZipArchive, ZipWriter};

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Helper to write a zip archive from (entry, bytes) pairs
    fn build_archive(path: &Path, entries: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        for (name, bytes) in entries {
            zip.start_file(*name, FileOptions::default())?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(())
    }

    fn json_bytes(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn read_entry(path: &Path, name: &str) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut entry = archive.by_name(name)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn entry_names(path: &Path) -> Result<Vec<String>> {
        let archive = ZipArchive::new(File::open(path)?)?;
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        Ok(names)
    }

    fn document_json() -> Value {
        json!({
            "_class": "document",
            "do_objectID": "DOC",
            "currentPageIndex": 0,
            "colorSpace": 1,
            "pages": [
                {"_class": "MSJSONFileReference", "_ref_class": "MSImmutablePage", "_ref": "pages/P1"}
            ]
        })
    }

    fn page_json(bitmap_ref: &str) -> Value {
        json!({
            "_class": "page",
            "do_objectID": "P1",
            "name": "Page 1",
            "layers": [{
                "_class": "artboard",
                "do_objectID": "A1",
                "name": "Board",
                "frame": {"_class": "rect", "x": 0, "y": 0, "width": 800, "height": 600},
                "layers": [{
                    "_class": "bitmap",
                    "do_objectID": "B1",
                    "name": "Cheese",
                    "frame": "{{10, 20}, {216, 216}}",
                    "image": {"_class": "MSJSONFileReference", "_ref_class": "MSImageData", "_ref": bitmap_ref}
                }]
            }]
        })
    }

    /// One page, one artboard, one bitmap, one image entry
    fn scenario_archive(dir: &Path) -> Result<PathBuf> {
        let path = dir.join("Scenario.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("meta.json", json_bytes(&json!({"appVersion": "49.3", "build": 51167}))),
                ("user.json", json_bytes(&json!({"document": {"pageListHeight": 150}}))),
                ("pages/P1.json", json_bytes(&page_json("images/B1.png"))),
                ("images/B1.png", PNG_BYTES.to_vec()),
                ("previews/preview.png", b"preview".to_vec()),
            ],
        )?;
        Ok(path)
    }

    // ========================================================================
    // Reading
    // ========================================================================

    #[test]
    fn test_read_scenario_archive() -> Result<()> {
        init_tracing();
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;

        let file = read_document(&path)?;
        assert_eq!(file.document.current_page_index, 0);
        assert_eq!(file.document.color_space, 1);
        assert_eq!(file.meta.app_version, "49.3");
        assert_eq!(file.user.page_list_height, 150.0);

        let page = file.page(&ObjectId::from("P1")).expect("page P1");
        let artboard = page.layers.children(None)[0];
        assert_eq!(page.layers.get(artboard).unwrap().class(), "artboard");
        let bitmap = page.layers.children(Some(artboard))[0];
        let layer = page.layers.get(bitmap).unwrap();
        assert_eq!(layer.class(), "bitmap");
        assert_eq!(page.layers.parent(bitmap), Some(artboard));
        assert_eq!(layer.frame().width, 216.0);

        let sidecar = temp_dir.path().join("Scenario_images").join("Cheese.png");
        assert_eq!(fs::read(&sidecar)?, PNG_BYTES);
        assert_eq!(file.images_dir(), Some(temp_dir.path().join("Scenario_images").as_path()));

        assert_eq!(file.previews, vec!["previews/preview.png".to_string()]);
        assert_eq!(
            fs::read(temp_dir.path().join("Scenario_images").join("preview.png"))?,
            b"preview"
        );
        assert!(file.unresolved_assets().is_empty());
        assert_eq!(file.current_page().unwrap().name(), "Page 1");
        Ok(())
    }

    #[test]
    fn test_pages_keyed_by_object_id_not_entry_name() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("Keys.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&json!({"_class": "document"}))),
                ("pages/whatever.json", json_bytes(&json!({"_class": "page", "do_objectID": "REAL"}))),
            ],
        )?;

        let file = read_document(&path)?;
        assert!(file.page(&ObjectId::from("REAL")).is_some());
        assert!(file.page(&ObjectId::from("whatever")).is_none());
        Ok(())
    }

    #[test]
    fn test_extensionless_reference_falls_back_to_png() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("Legacy.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("pages/P1.json", json_bytes(&page_json("images/B1"))),
                ("images/B1.png", PNG_BYTES.to_vec()),
            ],
        )?;

        let file = read_document(&path)?;
        assert!(file.unresolved_assets().is_empty());
        assert_eq!(
            fs::read(temp_dir.path().join("Legacy_images").join("Cheese.png"))?,
            PNG_BYTES
        );
        Ok(())
    }

    #[test]
    fn test_find_over_read_document() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;
        let file = read_document(&path)?;

        let found = file.find(&LayerFilter::new().with_class("bitmap"));
        assert_eq!(found.len(), 1);
        assert_eq!(file.layer(&found[0]).unwrap().name(), "Cheese");
        assert_eq!(file.find(&LayerFilter::new().with_pattern("Bo")).len(), 1);
        assert!(file.find(&LayerFilter::new().with_name("Nope")).is_empty());
        Ok(())
    }

    // ========================================================================
    // Read Errors
    // ========================================================================

    #[test]
    fn test_wrong_extension_is_not_a_sketch_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("drawing.zip");
        build_archive(&path, &[("document.json", json_bytes(&document_json()))])?;

        let result = read_document(&path);
        assert!(matches!(result, Err(SketchError::NotASketchFile { .. })));
        Ok(())
    }

    #[test]
    fn test_garbage_is_corrupt_archive() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("broken.sketch");
        fs::write(&path, b"this is not a zip file")?;

        let result = read_document(&path);
        assert!(matches!(result, Err(SketchError::CorruptArchive { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_document_entry_is_fatal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("empty.sketch");
        build_archive(&path, &[("pages/P1.json", json_bytes(&page_json("images/B1.png")))])?;

        let result = read_document(&path);
        assert!(matches!(result, Err(SketchError::MissingDocumentEntry { .. })));
        Ok(())
    }

    #[test]
    fn test_unknown_layer_type_aborts_read() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("future.sketch");
        let page = json!({
            "_class": "page",
            "do_objectID": "P1",
            "layers": [{"_class": "artboard", "layers": [{"_class": "hologram"}]}]
        });
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("pages/P1.json", json_bytes(&page)),
            ],
        )?;

        match read_document(&path) {
            Err(SketchError::Schema(SchemaError::UnknownLayerType { class })) => {
                assert_eq!(class, "hologram");
            }
            other => panic!("expected UnknownLayerType, got {:?}", other.map(|f| f.to_string())),
        }
        Ok(())
    }

    #[test]
    fn test_invalid_json_names_entry() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("bad.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("pages/P1.json", b"{not json".to_vec()),
            ],
        )?;

        match read_document(&path) {
            Err(SketchError::InvalidJson { entry, .. }) => assert_eq!(entry, "pages/P1.json"),
            other => panic!("expected InvalidJson, got {:?}", other.map(|f| f.to_string())),
        }
        Ok(())
    }

    #[test]
    fn test_missing_image_is_reported_not_fatal() -> Result<()> {
        init_tracing();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("NoImage.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("pages/P1.json", json_bytes(&page_json("images/B1.png"))),
            ],
        )?;

        let file = read_document(&path)?;
        let unresolved = file.unresolved_assets();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].layer_id, ObjectId::from("B1"));
        assert_eq!(unresolved[0].layer_name, "Cheese");
        assert_eq!(unresolved[0].reference, "images/B1.png");
        assert!(!temp_dir.path().join("NoImage_images").join("Cheese.png").exists());
        Ok(())
    }

    // ========================================================================
    // Sidecar Policy
    // ========================================================================

    #[test]
    fn test_existing_sidecar_kept_unless_overwrite() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;
        let images = temp_dir.path().join("Scenario_images");
        fs::create_dir_all(&images)?;
        fs::write(images.join("Cheese.png"), b"edited")?;

        read_document(&path)?;
        assert_eq!(fs::read(images.join("Cheese.png"))?, b"edited");

        let reader = SketchReader::new(SketchConfig {
            overwrite_images: true,
            ..SketchConfig::default()
        });
        reader.read(&path)?;
        assert_eq!(fs::read(images.join("Cheese.png"))?, PNG_BYTES);
        Ok(())
    }

    /// Two bitmaps named "Twin" whose images differ
    fn twins_archive(dir: &Path) -> Result<PathBuf> {
        let path = dir.join("Twins.sketch");
        let page = json!({
            "_class": "page",
            "do_objectID": "P1",
            "layers": [
                {"_class": "bitmap", "name": "Twin", "image": {"_class": "MSJSONFileReference", "_ref": "images/first.png"}},
                {"_class": "bitmap", "name": "Twin", "image": {"_class": "MSJSONFileReference", "_ref": "images/second.png"}}
            ]
        });
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("pages/P1.json", json_bytes(&page)),
                ("images/first.png", b"first".to_vec()),
                ("images/second.png", b"second".to_vec()),
            ],
        )?;
        Ok(path)
    }

    #[test]
    fn test_same_name_bitmaps_last_write_wins() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = twins_archive(temp_dir.path())?;

        read_document(&path)?;
        assert_eq!(
            fs::read(temp_dir.path().join("Twins_images").join("Twin.png"))?,
            b"second"
        );
        Ok(())
    }

    #[test]
    fn test_same_name_bitmaps_keep_existing_sidecar() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = twins_archive(temp_dir.path())?;
        let images = temp_dir.path().join("Twins_images");
        fs::create_dir_all(&images)?;
        fs::write(images.join("Twin.png"), b"edited")?;

        read_document(&path)?;
        assert_eq!(fs::read(images.join("Twin.png"))?, b"edited");

        let reader = SketchReader::new(SketchConfig {
            overwrite_images: true,
            ..SketchConfig::default()
        });
        reader.read(&path)?;
        assert_eq!(fs::read(images.join("Twin.png"))?, b"second");
        Ok(())
    }

    #[test]
    fn test_preview_without_file_name_is_skipped() -> Result<()> {
        init_tracing();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("Odd.sketch");
        build_archive(
            &path,
            &[
                ("document.json", json_bytes(&document_json())),
                ("previews/..", b"dots".to_vec()),
                ("previews/preview.png", b"preview".to_vec()),
            ],
        )?;

        let file = read_document(&path)?;
        assert_eq!(file.previews, vec!["previews/preview.png".to_string()]);
        assert_eq!(
            fs::read(temp_dir.path().join("Odd_images").join("preview.png"))?,
            b"preview"
        );
        Ok(())
    }

    // ========================================================================
    // Writing
    // ========================================================================

    #[test]
    fn test_write_reproduces_entries() -> Result<()> {
        init_tracing();
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;
        let file = read_document(&path)?;

        let out = temp_dir.path().join("Out.sketch");
        write_document(&out, &file)?;

        assert_eq!(
            entry_names(&out)?,
            vec![
                "document.json",
                "images/B1.png",
                "meta.json",
                "pages/P1.json",
                "previews/preview.png",
                "user.json",
            ]
        );

        let document: Value = serde_json::from_slice(&read_entry(&out, "document.json")?)?;
        assert_eq!(DocumentNode::from_value(&document), file.document);

        let page: Value = serde_json::from_slice(&read_entry(&out, "pages/P1.json")?)?;
        assert_eq!(&Page::from_value(&page)?, file.page(&ObjectId::from("P1")).unwrap());

        assert_eq!(read_entry(&out, "images/B1.png")?, PNG_BYTES);
        assert_eq!(read_entry(&out, "previews/preview.png")?, b"preview");
        Ok(())
    }

    #[test]
    fn test_reread_written_archive_is_equal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;
        let file = read_document(&path)?;

        let out = temp_dir.path().join("Copy.sketch");
        write_document(&out, &file)?;
        let again = read_document(&out)?;

        assert_eq!(again.document, file.document);
        assert_eq!(again.meta, file.meta);
        assert_eq!(again.user, file.user);
        assert_eq!(again.pages, file.pages);
        assert_eq!(
            fs::read(temp_dir.path().join("Copy_images").join("Cheese.png"))?,
            PNG_BYTES
        );
        Ok(())
    }

    #[test]
    fn test_missing_sidecar_fails_without_touching_target() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = scenario_archive(temp_dir.path())?;
        let file = read_document(&path)?;
        fs::remove_file(temp_dir.path().join("Scenario_images").join("Cheese.png"))?;

        let before = fs::read(&path)?;
        match write_document(&path, &file) {
            Err(SketchError::MissingSidecar { layer, .. }) => assert_eq!(layer, "Cheese"),
            other => panic!("expected MissingSidecar, got {:?}", other),
        }
        assert_eq!(fs::read(&path)?, before);
        Ok(())
    }

    #[test]
    fn test_write_document_built_in_memory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("Fresh.sketch");

        let mut file = SketchFile::new();
        let page_id = file.add_page("Drafts");
        {
            let (page, ids) = file.edit_page(&page_id).unwrap();
            let bitmap = Bitmap {
                name: "Photo".to_string(),
                image: ImageReference::new("images/photo.png"),
                ..Bitmap::default()
            };
            page.append_layer(None, Layer::from(bitmap), ids)?;
        }

        let images = temp_dir.path().join("Fresh_images");
        fs::create_dir_all(&images)?;
        fs::write(images.join("Photo.png"), PNG_BYTES)?;

        write_document(&out, &file)?;
        let again = read_document(&out)?;

        assert_eq!(again.pages.len(), 1);
        assert_eq!(again.ordered_pages()[0].name(), "Drafts");
        let bitmaps = again.bitmaps();
        assert_eq!(bitmaps.len(), 1);
        assert!(!bitmaps[0].object_id.is_empty());
        assert_eq!(read_entry(&out, "images/photo.png")?, PNG_BYTES);
        assert_eq!(
            again.document.to_value().unwrap()["pages"][0]["_ref"],
            format!("pages/{}", page_id)
        );
        Ok(())
    }
}
