//! Device manifest synthesizer.

use crate::manifest::{locale_table, manifest_record};
use crate::{DEVICE_MANIFEST_VERSION, DeviceManifest, ManifestContext, SVG_MAIN, SVG_WIDGETS};
use std::collections::BTreeMap;
use wristkit_core::{
    AppType, BuildError, BuildResult, BuildTargetDescriptor, ComponentType, Diagnostic, FileRecord,
};
use wristkit_stream::{Accumulator, RecordStream, accumulate};

/// First device API that understands the `supports` block
const SUPPORTS_MIN_API: semver::Version = semver::Version::new(5, 0, 0);

/// Watches a device bundle stream and appends its `manifest.json`.
#[derive(Debug)]
pub struct DeviceManifestBuilder {
    context: ManifestContext,
    target: BuildTargetDescriptor,
    entry_points: Vec<String>,
    unexpected: Vec<String>,
    translations: BTreeMap<String, String>,
    icon_seen: bool,
}

impl DeviceManifestBuilder {
    pub fn new(context: ManifestContext, target: BuildTargetDescriptor) -> Self {
        Self {
            context,
            target,
            entry_points: Vec::new(),
            unexpected: Vec::new(),
            translations: BTreeMap::new(),
            icon_seen: false,
        }
    }

    fn entry_point(&self) -> BuildResult<String> {
        if !self.unexpected.is_empty() {
            return Err(BuildError::fatal(
                self.name(),
                format!(
                    "Unexpected entry points in the device bundle: {}",
                    self.unexpected.join(", ")
                ),
            ));
        }
        match self.entry_points.as_slice() {
            [] => Err(BuildError::fatal(
                self.name(),
                "No entry point found for the device component",
            )),
            [main] => Ok(main.clone()),
            many => Err(BuildError::fatal(
                self.name(),
                format!(
                    "Multiple entry points found for the device component: {}",
                    many.join(", ")
                ),
            )),
        }
    }

    fn supports(&self) -> Option<serde_json::Value> {
        let capabilities = self.target.capabilities.clone()?;
        if self.target.api_version >= SUPPORTS_MIN_API {
            return Some(capabilities);
        }
        self.context.diagnostics.push(
            Diagnostic::warning(format!(
                "Device capabilities for {} are not included: API {} predates {SUPPORTS_MIN_API}",
                self.target.name, self.target.api_version
            ))
            .with_target(ComponentType::Device),
        );
        None
    }

    fn icon_file(&self) -> Option<String> {
        let config = &self.context.config;
        if config.app_type != AppType::App {
            return None;
        }
        if self.icon_seen {
            return Some(config.icon_file.clone());
        }
        self.context.diagnostics.push(
            Diagnostic::warning(format!(
                "Icon file {} was not found; a default icon will be shown",
                config.icon_file
            ))
            .with_target(ComponentType::Device),
        );
        None
    }
}

impl Accumulator for DeviceManifestBuilder {
    fn name(&self) -> &'static str {
        "device-manifest"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        if record.metadata.entry_point {
            if record.metadata.component == Some(ComponentType::Device) {
                self.entry_points.push(record.path().to_string());
            } else {
                self.unexpected.push(record.path().to_string());
            }
        }
        if let Some(language) = &record.metadata.translation_language {
            self.translations
                .insert(language.clone(), record.path().to_string());
        }
        if record.path() == self.context.config.icon_file {
            self.icon_seen = true;
        }
        Ok(Some(record))
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        let main = self.entry_point()?;
        let supports = self.supports();
        let icon_file = self.icon_file();
        let config = &self.context.config;

        let wipe_color = match config.app_type {
            AppType::App => config.wipe_color.clone(),
            AppType::Clockface => None,
        };

        let manifest = DeviceManifest {
            app_manifest_version: DEVICE_MANIFEST_VERSION,
            main,
            svg_main: SVG_MAIN.to_string(),
            svg_widgets: SVG_WIDGETS.to_string(),
            app_type: config.app_type.manifest_value().to_string(),
            i18n: locale_table(config, &self.translations),
            api_version: self.target.api_version.to_string(),
            build_id: self.context.build_id.to_string(),
            bundle_date: self.context.bundle_date.clone(),
            name: config.name.clone(),
            uuid: config.app_uuid.to_string(),
            requested_permissions: config.requested_permissions.clone(),
            icon_file,
            wipe_color,
            supports,
        };

        tracing::info!(family = %self.target.name, main = %manifest.main, "device manifest written");
        Ok(vec![manifest_record(&manifest)?])
    }
}

/// Append the device manifest for `target` to a device bundle stream
pub fn device_manifest(
    input: RecordStream,
    context: ManifestContext,
    target: BuildTargetDescriptor,
) -> RecordStream {
    accumulate(input, DeviceManifestBuilder::new(context, target))
}
