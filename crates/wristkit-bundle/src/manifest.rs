//! Manifest schemas.
//!
//! These types serialize to the `manifest.json` files consumed by the
//! device firmware, the companion runtime and the package installer.
//! Field order in each struct is the serialized key order.

use crate::{BundleError, BundleResult, MANIFEST_FILE, PACKAGE_MANIFEST_VERSION};
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use wristkit_core::{BuildId, BuildResult, Diagnostics, FileRecord, ProjectConfig};

/// Shared inputs for every manifest synthesizer in one build.
#[derive(Debug, Clone)]
pub struct ManifestContext {
    pub config: Arc<ProjectConfig>,
    pub build_id: BuildId,
    /// ISO-8601 timestamp shared by every manifest of the build
    pub bundle_date: String,
    pub diagnostics: Diagnostics,
}

impl ManifestContext {
    pub fn new(config: Arc<ProjectConfig>, build_id: BuildId, diagnostics: Diagnostics) -> Self {
        Self {
            config,
            build_id,
            bundle_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            diagnostics,
        }
    }

    /// Pin the bundle date (reproducible builds and tests)
    #[must_use]
    pub fn with_bundle_date(mut self, date: impl Into<String>) -> Self {
        self.bundle_date = date.into();
        self
    }
}

/// Per-locale entry of a manifest `i18n` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleEntry {
    pub name: String,

    /// Path of the compiled translation table, device manifests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,
}

/// `{ "main": ... }` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainEntry {
    pub main: String,
}

/// Device bundle `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceManifest {
    pub app_manifest_version: u32,
    pub main: String,
    pub svg_main: String,
    pub svg_widgets: String,
    pub app_type: String,
    pub i18n: IndexMap<String, LocaleEntry>,
    pub api_version: String,
    pub build_id: String,
    pub bundle_date: String,
    pub name: String,
    pub uuid: String,
    pub requested_permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wipe_color: Option<String>,

    /// Device capability block, only understood by newer firmware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports: Option<serde_json::Value>,
}

/// Companion bundle `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionManifest {
    pub manifest_version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion: Option<MainEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<MainEntry>,

    pub app_type: String,
    pub i18n: IndexMap<String, LocaleEntry>,
    pub api_version: String,
    pub build_id: String,
    pub bundle_date: String,
    pub name: String,
    pub uuid: String,
    pub requested_permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_clusters: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_profile_id: Option<String>,
}

/// Device bundle entry of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceComponent {
    pub filename: String,
    pub platform: Vec<String>,
}

/// Companion bundle entry of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionComponent {
    pub filename: String,
}

/// Component bundles listed in the package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// Device bundles keyed by family
    #[serde(rename = "watch", default, skip_serializing_if = "IndexMap::is_empty")]
    pub device: IndexMap<String, DeviceComponent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion: Option<CompanionComponent>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.device.is_empty() && self.companion.is_none()
    }

    /// Every bundle file name, device bundles first
    pub fn filenames(&self) -> Vec<&str> {
        self.device
            .values()
            .map(|c| c.filename.as_str())
            .chain(self.companion.iter().map(|c| c.filename.as_str()))
            .collect()
    }
}

/// Source map locations by component, family and compiled file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapIndex {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub device: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub companion: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

impl SourceMapIndex {
    pub fn is_empty(&self) -> bool {
        self.device.is_empty() && self.companion.is_empty() && self.settings.is_empty()
    }
}

/// SDK API versions the package was built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkVersionInfo {
    pub device_api: String,
    pub companion_api: String,
}

/// Package (`.fba`) `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub manifest_version: u32,
    pub build_id: String,
    pub components: Components,
    #[serde(default)]
    pub source_maps: SourceMapIndex,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<SdkVersionInfo>,

    #[serde(default)]
    pub requested_permissions: Vec<String>,
    pub app_id: String,
}

impl PackageManifest {
    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> BundleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the manifest to pretty JSON.
    pub fn to_json(&self) -> BundleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate a manifest read back from disk.
    pub fn validate(&self) -> BundleResult<()> {
        if self.manifest_version != PACKAGE_MANIFEST_VERSION {
            return Err(BundleError::InvalidManifest(format!(
                "unsupported manifestVersion {} (expected {PACKAGE_MANIFEST_VERSION})",
                self.manifest_version
            )));
        }

        if BuildId::parse(&self.build_id).is_none() {
            return Err(BundleError::InvalidManifest(format!(
                "buildId is not a hex value: {}",
                self.build_id
            )));
        }

        if self.components.is_empty() {
            return Err(BundleError::InvalidManifest(
                "at least one component must be listed".to_string(),
            ));
        }

        for (family, component) in &self.components.device {
            if component.filename.is_empty() {
                return Err(BundleError::InvalidManifest(format!(
                    "components.watch.{family}: filename is required"
                )));
            }
        }

        Ok(())
    }
}

/// Locale map for a manifest.
///
/// Languages come from the configured display names and from compiled
/// translations. The default language is always first and keys are
/// lower-cased.
pub(crate) fn locale_table(
    config: &ProjectConfig,
    resources: &BTreeMap<String, String>,
) -> IndexMap<String, LocaleEntry> {
    let languages = std::iter::once(config.default_language.as_str())
        .chain(config.i18n.keys().map(String::as_str))
        .chain(resources.keys().map(String::as_str));

    let mut table = IndexMap::new();
    for language in languages {
        let key = language.to_ascii_lowercase();
        if table.contains_key(&key) {
            continue;
        }
        let resource = resources
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(language))
            .map(|(_, path)| path.clone());
        table.insert(
            key,
            LocaleEntry {
                name: config.locale_name(language).to_string(),
                resources: resource,
            },
        );
    }
    table
}

/// Serialize a manifest into a `manifest.json` record
pub(crate) fn manifest_record<T: Serialize>(manifest: &T) -> BuildResult<FileRecord> {
    let json = serde_json::to_vec_pretty(manifest)?;
    Ok(FileRecord::buffer(MANIFEST_FILE, Bytes::from(json)))
}

#[cfg(test)]
#[path = "manifest/manifest_tests.rs"]
mod manifest_tests;
