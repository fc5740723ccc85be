#![allow(non_snake_case)]

use super::*;
use uuid::Uuid;
use wristkit_core::LocaleInfo;

fn config() -> ProjectConfig {
    let mut config = ProjectConfig::new(Uuid::nil(), "Timer");
    config.i18n.insert(
        "fr-FR".to_string(),
        LocaleInfo {
            name: "Minuteur".to_string(),
        },
    );
    config.i18n.insert(
        "en-US".to_string(),
        LocaleInfo {
            name: "Timer".to_string(),
        },
    );
    config
}

fn package() -> PackageManifest {
    PackageManifest {
        manifest_version: PACKAGE_MANIFEST_VERSION,
        build_id: "0x0000000000000001".to_string(),
        components: Components {
            device: IndexMap::from([(
                "atlas".to_string(),
                DeviceComponent {
                    filename: "device-atlas.zip".to_string(),
                    platform: vec![">=32.1.0.0".to_string()],
                },
            )]),
            companion: None,
        },
        source_maps: SourceMapIndex::default(),
        sdk_version: None,
        requested_permissions: Vec::new(),
        app_id: Uuid::nil().to_string(),
    }
}

// locale_table tests

#[test]
fn locale_table___default_language___ordered_first() {
    let table = locale_table(&config(), &BTreeMap::new());

    let keys: Vec<&str> = table.keys().map(String::as_str).collect();
    assert_eq!(keys, ["en-us", "fr-fr"]);
    assert_eq!(table["fr-fr"].name, "Minuteur");
}

#[test]
fn locale_table___translations___attach_resources() {
    let resources = BTreeMap::from([
        ("en-US".to_string(), "l/en-US".to_string()),
        ("de-DE".to_string(), "l/de-DE".to_string()),
    ]);

    let table = locale_table(&config(), &resources);

    assert_eq!(table["en-us"].resources.as_deref(), Some("l/en-US"));
    assert_eq!(table["fr-fr"].resources, None);
    assert_eq!(table["de-de"].name, "Timer");
}

// PackageManifest tests

#[test]
fn PackageManifest___json___uses_wire_names() {
    let json = package().to_json().unwrap();

    assert!(json.contains("\"manifestVersion\": 6"));
    assert!(json.contains("\"watch\""));
    assert!(json.contains("\"appId\""));
    assert!(!json.contains("\"sdkVersion\""));
}

#[test]
fn PackageManifest___from_json___round_trips() {
    let manifest = package();

    let parsed = PackageManifest::from_json(&manifest.to_json().unwrap()).unwrap();

    assert_eq!(parsed, manifest);
}

#[test]
fn PackageManifest___validate___accepts_well_formed() {
    assert!(package().validate().is_ok());
}

#[test]
fn PackageManifest___validate___rejects_wrong_version() {
    let mut manifest = package();
    manifest.manifest_version = 5;

    assert!(matches!(
        manifest.validate(),
        Err(BundleError::InvalidManifest(_))
    ));
}

#[test]
fn PackageManifest___validate___rejects_bad_build_id() {
    let mut manifest = package();
    manifest.build_id = "12".to_string();

    assert!(manifest.validate().is_err());
}

#[test]
fn PackageManifest___validate___rejects_no_components() {
    let mut manifest = package();
    manifest.components = Components::default();

    assert!(manifest.validate().is_err());
}
