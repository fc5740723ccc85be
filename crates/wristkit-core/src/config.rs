//! Project and build-target configuration
//!
//! [`ProjectConfig`] is loaded once from `wristkit.toml` and treated as
//! read-only by the pipeline. [`BuildTargetRegistry`] is assembled once from
//! the built-in table plus an optional override table and passed explicitly
//! to the orchestrator.

use crate::{BuildError, BuildResult, Diagnostic};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Project configuration file name
pub const PROJECT_CONFIG_FILE: &str = "wristkit.toml";

const MAX_NAME_LENGTH: usize = 30;
const MAX_CLUSTER_ID_LENGTH: usize = 64;

/// Kind of application being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    #[default]
    App,
    Clockface,
}

impl AppType {
    /// Value written to the device manifest
    pub fn manifest_value(&self) -> &'static str {
        match self {
            AppType::App => "APP",
            AppType::Clockface => "CLOCKFACE",
        }
    }
}

/// Per-locale display information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleInfo {
    pub name: String,
}

/// Companion cluster storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClusterStorage {
    #[serde(default)]
    pub app_clusters: Vec<String>,
    #[serde(default)]
    pub developer_profile_id: Option<Uuid>,
}

/// SDK API versions recorded in the package manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkVersion {
    pub device_api: String,
    pub companion_api: String,
}

/// Project configuration (`wristkit.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub app_uuid: Uuid,

    #[serde(default)]
    pub app_type: AppType,

    pub name: String,

    /// Per-locale display names
    #[serde(default)]
    pub i18n: IndexMap<String, LocaleInfo>,

    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default)]
    pub requested_permissions: Vec<String>,

    /// Enabled build target names
    #[serde(default)]
    pub build_targets: Vec<String>,

    #[serde(default)]
    pub wipe_color: Option<String>,

    #[serde(default = "default_icon_file")]
    pub icon_file: String,

    #[serde(default)]
    pub app_cluster_storage: Option<AppClusterStorage>,

    /// Prebuilt native device components, relative to the project root
    #[serde(default)]
    pub native_components: Vec<String>,

    #[serde(default)]
    pub sdk_version: Option<SdkVersion>,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_icon_file() -> String {
    "resources/icon.png".to_string()
}

impl ProjectConfig {
    /// Create a minimal configuration
    pub fn new(app_uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            app_uuid,
            app_type: AppType::App,
            name: name.into(),
            i18n: IndexMap::new(),
            default_language: default_language(),
            requested_permissions: Vec::new(),
            build_targets: Vec::new(),
            wipe_color: None,
            icon_file: default_icon_file(),
            app_cluster_storage: None,
            native_components: Vec::new(),
            sdk_version: None,
        }
    }

    /// Load configuration from a project directory or file
    pub fn load(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let file = if path.is_dir() {
            path.join(PROJECT_CONFIG_FILE)
        } else {
            path.to_path_buf()
        };
        let content = std::fs::read_to_string(&file).map_err(|e| {
            BuildError::Config(format!("failed to read {}: {e}", file.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> BuildResult<Self> {
        toml::from_str(content).map_err(|e| BuildError::Config(e.to_string()))
    }

    /// Display name for a locale, falling back to the project name
    pub fn locale_name(&self, language: &str) -> &str {
        self.i18n
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(language))
            .map(|(_, info)| info.name.as_str())
            .unwrap_or(&self.name)
    }

    pub fn has_native_components(&self) -> bool {
        !self.native_components.is_empty()
    }

    /// Validate the configuration.
    ///
    /// Returns every problem found; any error-category diagnostic means the
    /// project must not be built.
    pub fn validate(&self, targets: &BuildTargetRegistry) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.name.trim().is_empty() {
            diagnostics.push(Diagnostic::error("Application name must not be empty"));
        } else if self.name.chars().count() > MAX_NAME_LENGTH {
            diagnostics.push(Diagnostic::error(format!(
                "Application name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }

        if self.build_targets.is_empty() && !self.has_native_components() {
            diagnostics.push(Diagnostic::error("At least one build target must be enabled"));
        }
        for target in &self.build_targets {
            if targets.get(target).is_none() {
                diagnostics.push(Diagnostic::error(format!("Unknown build target: {target}")));
            }
        }

        if !is_language_shaped(&self.default_language) {
            diagnostics.push(Diagnostic::error(format!(
                "Default language is not a valid language tag: {}",
                self.default_language
            )));
        }

        for tag in self.i18n.keys() {
            if !is_language_shaped(tag) {
                diagnostics.push(Diagnostic::error(format!(
                    "Localized name has an invalid language tag: {tag}"
                )));
            }
        }

        if let Some(color) = &self.wipe_color {
            if !is_hex_color(color) {
                diagnostics.push(Diagnostic::error(format!(
                    "Wipe color must be of the form #rrggbb: {color}"
                )));
            }
        }

        if let Some(storage) = &self.app_cluster_storage {
            if storage.developer_profile_id.is_none() {
                diagnostics.push(Diagnostic::error(
                    "App cluster storage requires a developer profile id",
                ));
            }
            for id in &storage.app_clusters {
                if id.is_empty() || id.len() > MAX_CLUSTER_ID_LENGTH {
                    diagnostics.push(Diagnostic::error(format!(
                        "App cluster id must be 1-{MAX_CLUSTER_ID_LENGTH} characters: {id:?}"
                    )));
                }
            }
        }

        if self.app_type == AppType::Clockface && self.wipe_color.is_some() {
            diagnostics.push(Diagnostic::warning(
                "Wipe color is ignored for clockfaces",
            ));
        }

        diagnostics
    }
}

fn is_language_shaped(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let language = parts.next().unwrap_or_default();
    (2..=3).contains(&language.len())
        && language.chars().all(|c| c.is_ascii_alphabetic())
        && parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// One supported device family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildTargetDescriptor {
    /// Family name, e.g. `atlas`
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    /// Tag selecting `name~tag.ext` resource variants
    pub resource_filter_tag: String,

    /// Platform compatibility ranges
    #[serde(default)]
    pub platform: Vec<String>,

    /// Device API version negotiated for this family
    pub api_version: semver::Version,

    /// Device capability block for the manifest
    #[serde(default)]
    pub capabilities: Option<serde_json::Value>,

    /// Per-path byte ceilings inside the device bundle
    #[serde(default)]
    pub size_limits: BTreeMap<String, u64>,
}

impl BuildTargetDescriptor {
    fn builtin(
        name: &str,
        display_name: &str,
        tag: &str,
        platform: &str,
        api: (u64, u64, u64),
        screen: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            resource_filter_tag: tag.to_string(),
            platform: vec![platform.to_string()],
            api_version: semver::Version::new(api.0, api.1, api.2),
            capabilities: Some(serde_json::json!({
                "screenSize": { "w": screen, "h": screen },
            })),
            size_limits: BTreeMap::from([("resources/icon.png".to_string(), 10 * 1024)]),
        }
    }
}

/// Immutable table of build targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildTargetRegistry {
    targets: IndexMap<String, BuildTargetDescriptor>,
}

#[derive(Deserialize)]
struct OverrideTable {
    #[serde(default)]
    targets: IndexMap<String, BuildTargetDescriptor>,
}

impl BuildTargetRegistry {
    /// The base table shipped with the toolchain
    pub fn builtin() -> Self {
        let targets = [
            BuildTargetDescriptor::builtin("hera", "Hera", "300x300", ">=27.33.1.1", (4, 2, 0), 300),
            BuildTargetDescriptor::builtin("rhea", "Rhea", "300x300", ">=27.33.1.1", (4, 2, 0), 300),
            BuildTargetDescriptor::builtin("atlas", "Atlas", "336x336", ">=32.1.0.0", (7, 1, 0), 336),
            BuildTargetDescriptor::builtin("vulcan", "Vulcan", "336x336", ">=32.1.0.0", (7, 1, 0), 336),
        ];
        Self::from_targets(targets)
    }

    pub fn from_targets(targets: impl IntoIterator<Item = BuildTargetDescriptor>) -> Self {
        Self {
            targets: targets.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Merge an override table; overrides replace targets with the same name
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = BuildTargetDescriptor>,
    ) -> Self {
        for target in overrides {
            self.targets.insert(target.name.clone(), target);
        }
        self
    }

    /// Merge an override table given as TOML (`[targets.<name>]` sections)
    pub fn with_overrides_toml(self, content: &str) -> BuildResult<Self> {
        let table: OverrideTable =
            toml::from_str(content).map_err(|e| BuildError::Config(e.to_string()))?;
        let overrides = table.targets.into_iter().map(|(name, mut target)| {
            target.name = name;
            target
        });
        Ok(self.with_overrides(overrides))
    }

    pub fn get(&self, name: &str) -> Option<&BuildTargetDescriptor> {
        self.targets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Resolve the enabled targets of a project, in configuration order
    pub fn resolve(&self, names: &[String]) -> BuildResult<Vec<BuildTargetDescriptor>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| BuildError::Config(format!("unknown build target: {name}")))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// 64-bit build identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildId(u64);

impl BuildId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Generate a fresh random build id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().as_u64_pair().0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parse a `0x`-prefixed hex string
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
        u64::from_str_radix(digits, 16).ok().map(Self)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}
