//! Companion manifest synthesizer.

use crate::manifest::{locale_table, manifest_record};
use crate::{COMPANION_MANIFEST_VERSION, CompanionManifest, MainEntry, ManifestContext};
use std::collections::BTreeMap;
use wristkit_core::{BuildError, BuildResult, ComponentType, FileRecord};
use wristkit_stream::{Accumulator, RecordStream, accumulate};

/// Companion API recorded when the project does not pin one
const DEFAULT_COMPANION_API: &str = "1.0.0";

/// Watches the companion bundle stream and appends its `manifest.json`.
///
/// The companion and settings roles are each optional, but at most one
/// entry point may exist per role and at least one role must be filled.
#[derive(Debug)]
pub struct CompanionManifestBuilder {
    context: ManifestContext,
    companion: Vec<String>,
    settings: Vec<String>,
    unexpected: Vec<String>,
}

impl CompanionManifestBuilder {
    pub fn new(context: ManifestContext) -> Self {
        Self {
            context,
            companion: Vec::new(),
            settings: Vec::new(),
            unexpected: Vec::new(),
        }
    }

    fn single(&self, role: ComponentType, seen: &[String]) -> BuildResult<Option<MainEntry>> {
        match seen {
            [] => Ok(None),
            [main] => Ok(Some(MainEntry { main: main.clone() })),
            many => Err(BuildError::fatal(
                self.name(),
                format!(
                    "Multiple entry points found for the {role} component: {}",
                    many.join(", ")
                ),
            )),
        }
    }
}

impl Accumulator for CompanionManifestBuilder {
    fn name(&self) -> &'static str {
        "companion-manifest"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        if record.metadata.entry_point {
            let path = record.path().to_string();
            match record.metadata.component {
                Some(ComponentType::Companion) => self.companion.push(path),
                Some(ComponentType::Settings) => self.settings.push(path),
                _ => self.unexpected.push(path),
            }
        }
        Ok(Some(record))
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        if !self.unexpected.is_empty() {
            return Err(BuildError::fatal(
                self.name(),
                format!(
                    "Unexpected entry points in the companion bundle: {}",
                    self.unexpected.join(", ")
                ),
            ));
        }

        let companion = self.single(ComponentType::Companion, &self.companion)?;
        let settings = self.single(ComponentType::Settings, &self.settings)?;
        if companion.is_none() && settings.is_none() {
            return Err(BuildError::fatal(
                self.name(),
                "No entry point found for the companion or settings component",
            ));
        }

        let config = &self.context.config;
        let storage = config.app_cluster_storage.as_ref();
        let api_version = config
            .sdk_version
            .as_ref()
            .map(|sdk| sdk.companion_api.clone())
            .unwrap_or_else(|| DEFAULT_COMPANION_API.to_string());

        let manifest = CompanionManifest {
            manifest_version: COMPANION_MANIFEST_VERSION,
            companion,
            settings,
            app_type: config.app_type.manifest_value().to_string(),
            i18n: locale_table(config, &BTreeMap::new()),
            api_version,
            build_id: self.context.build_id.to_string(),
            bundle_date: self.context.bundle_date.clone(),
            name: config.name.clone(),
            uuid: config.app_uuid.to_string(),
            requested_permissions: config.requested_permissions.clone(),
            app_clusters: storage
                .filter(|s| !s.app_clusters.is_empty())
                .map(|s| s.app_clusters.clone()),
            developer_profile_id: storage
                .and_then(|s| s.developer_profile_id)
                .map(|id| id.to_string()),
        };

        tracing::info!(
            companion = manifest.companion.is_some(),
            settings = manifest.settings.is_some(),
            "companion manifest written"
        );
        Ok(vec![manifest_record(&manifest)?])
    }
}

/// Append the companion manifest to the companion bundle stream
pub fn companion_manifest(input: RecordStream, context: ManifestContext) -> RecordStream {
    accumulate(input, CompanionManifestBuilder::new(context))
}

#[cfg(test)]
#[path = "companion/companion_tests.rs"]
mod companion_tests;
