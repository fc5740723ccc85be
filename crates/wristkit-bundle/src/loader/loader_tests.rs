#![allow(non_snake_case)]

use super::*;
use crate::{
    CompanionComponent, Components, DeviceComponent, PACKAGE_MANIFEST_VERSION, SourceMapIndex,
};
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn manifest() -> PackageManifest {
    PackageManifest {
        manifest_version: PACKAGE_MANIFEST_VERSION,
        build_id: "0x00000000000000ff".to_string(),
        components: Components {
            device: IndexMap::from([(
                "atlas".to_string(),
                DeviceComponent {
                    filename: "device-atlas.zip".to_string(),
                    platform: Vec::new(),
                },
            )]),
            companion: Some(CompanionComponent {
                filename: "companion.zip".to_string(),
            }),
        },
        source_maps: SourceMapIndex::default(),
        sdk_version: None,
        requested_permissions: Vec::new(),
        app_id: "00000000-0000-0000-0000-000000000000".to_string(),
    }
}

fn create_package(temp_dir: &TempDir, manifest: &PackageManifest) -> PathBuf {
    let device = zip_bytes(&[
        ("manifest.json", br#"{"appManifestVersion":1,"main":"app/index.js"}"#),
        ("app/index.js", b"code"),
    ]);
    let companion = zip_bytes(&[("companion.js", b"code")]);
    let json = manifest.to_json().unwrap();

    let path = temp_dir.path().join("app.fba");
    fs::write(
        &path,
        zip_bytes(&[
            ("manifest.json", json.as_bytes()),
            ("device-atlas.zip", &device),
            ("companion.zip", &companion),
        ]),
    )
    .unwrap();
    path
}

#[test]
fn PackageLoader___open___reads_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_package(&temp_dir, &manifest());

    let loader = PackageLoader::open(&path).unwrap();

    assert_eq!(loader.manifest().build_id, "0x00000000000000ff");
    assert_eq!(
        loader.manifest().components.filenames(),
        ["device-atlas.zip", "companion.zip"]
    );
}

#[test]
fn PackageLoader___list_files___includes_components() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_package(&temp_dir, &manifest());

    let loader = PackageLoader::open(&path).unwrap();

    let files = loader.list_files();
    assert_eq!(files.len(), 3);
    assert!(loader.has_file("companion.zip"));
    assert!(!loader.has_file("missing.zip"));
}

#[test]
fn PackageLoader___read_component_manifest___parses_nested_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_package(&temp_dir, &manifest());
    let mut loader = PackageLoader::open(&path).unwrap();

    let device = loader.read_component_manifest("device-atlas.zip").unwrap();

    assert_eq!(device["main"], "app/index.js");
    assert_eq!(
        loader.component_files("device-atlas.zip").unwrap(),
        ["manifest.json", "app/index.js"]
    );
}

#[test]
fn PackageLoader___component_without_manifest___missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_package(&temp_dir, &manifest());
    let mut loader = PackageLoader::open(&path).unwrap();

    let err = loader.read_component_manifest("companion.zip").unwrap_err();

    assert!(matches!(err, BundleError::MissingFile(_)));
}

#[test]
fn PackageLoader___open___nonexistent_file___returns_error() {
    assert!(PackageLoader::open("/nonexistent/app.fba").is_err());
}

#[test]
fn PackageLoader___open___missing_manifest___returns_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.fba");
    fs::write(&path, zip_bytes(&[("other.txt", b"x")])).unwrap();

    let err = PackageLoader::open(&path).unwrap_err();

    assert!(matches!(err, BundleError::MissingFile(_)));
    assert!(err.to_string().contains("manifest.json"));
}

#[test]
fn PackageLoader___open___listed_component_absent___returns_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut manifest = manifest();
    manifest.components.device.insert(
        "vulcan".to_string(),
        DeviceComponent {
            filename: "device-vulcan.zip".to_string(),
            platform: Vec::new(),
        },
    );
    let path = create_package(&temp_dir, &manifest);

    let err = PackageLoader::open(&path).unwrap_err();

    assert!(err.to_string().contains("device-vulcan.zip"));
}
