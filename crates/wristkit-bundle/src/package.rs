//! Package manifest synthesizer.
//!
//! Sees every component bundle on its way into the outer archive and
//! enforces the cross-bundle rules: one bundle per (type, family) slot,
//! and device bundles are either all native or all JavaScript.

use crate::manifest::manifest_record;
use crate::{
    CompanionComponent, Components, DeviceComponent, ManifestContext, PACKAGE_MANIFEST_VERSION,
    PackageManifest, SdkVersionInfo, SourceMapIndex, source_map_path,
};
use std::collections::BTreeMap;
use wristkit_core::{BuildError, BuildResult, BundleKind, BundleTag, ComponentType, FileRecord};
use wristkit_stream::{Accumulator, RecordStream, accumulate};

#[derive(Debug)]
pub struct PackageManifestBuilder {
    context: ManifestContext,
    bundles: Vec<(String, BundleTag)>,
}

impl PackageManifestBuilder {
    pub fn new(context: ManifestContext) -> Self {
        Self {
            context,
            bundles: Vec::new(),
        }
    }

    fn check_native_mix(&self) -> BuildResult<()> {
        let (native, script): (Vec<_>, Vec<_>) = self
            .bundles
            .iter()
            .filter(|(_, tag)| matches!(tag.kind, BundleKind::Device { .. }))
            .partition(|(_, tag)| tag.kind.is_native());

        if native.is_empty() || script.is_empty() {
            return Ok(());
        }
        let names = |set: Vec<&(String, BundleTag)>| {
            set.into_iter()
                .map(|(path, _)| path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(BuildError::fatal(
            self.name(),
            format!(
                "Cannot mix native and JavaScript device bundles (native: {}; JavaScript: {})",
                names(native),
                names(script)
            ),
        ))
    }

    fn check_slots(&self) -> BuildResult<()> {
        let mut slots: BTreeMap<(&str, Option<&str>), Vec<&str>> = BTreeMap::new();
        for (path, tag) in &self.bundles {
            slots.entry(tag.kind.slot()).or_default().push(path.as_str());
        }

        let conflicts: Vec<String> = slots
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|((kind, family), paths)| match family {
                Some(family) => format!("{kind} ({family}): {}", paths.join(", ")),
                None => format!("{kind}: {}", paths.join(", ")),
            })
            .collect();

        if conflicts.is_empty() {
            return Ok(());
        }
        Err(BuildError::fatal(
            self.name(),
            format!(
                "Multiple bundles target the same component: {}",
                conflicts.join("; ")
            ),
        ))
    }

    fn components(&self) -> Components {
        let mut components = Components::default();
        for (path, tag) in &self.bundles {
            match &tag.kind {
                BundleKind::Device {
                    family, platform, ..
                } => {
                    components.device.insert(
                        family.clone(),
                        DeviceComponent {
                            filename: path.clone(),
                            platform: platform.clone(),
                        },
                    );
                }
                BundleKind::Companion => {
                    components.companion = Some(CompanionComponent {
                        filename: path.clone(),
                    });
                }
            }
        }
        components
    }

    fn source_maps(&self) -> SourceMapIndex {
        let mut index = SourceMapIndex::default();
        for (_, tag) in &self.bundles {
            for map in &tag.source_maps {
                let path = source_map_path(map, &tag.kind);
                let file = map.file.clone();
                match (map.component, &tag.kind) {
                    (ComponentType::Device, BundleKind::Device { family, .. }) => {
                        index
                            .device
                            .entry(family.clone())
                            .or_default()
                            .insert(file, path);
                    }
                    (ComponentType::Settings, _) => {
                        index.settings.insert(file, path);
                    }
                    _ => {
                        index.companion.insert(file, path);
                    }
                }
            }
        }
        index
    }
}

impl Accumulator for PackageManifestBuilder {
    fn name(&self) -> &'static str {
        "package-manifest"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        if let Some(tag) = &record.metadata.bundle {
            tracing::debug!(path = %record.path(), slot = ?tag.kind.slot(), "bundle observed");
            self.bundles.push((record.path().to_string(), tag.clone()));
        }
        Ok(Some(record))
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        if self.bundles.is_empty() {
            return Err(BuildError::fatal(
                self.name(),
                "No component bundles were produced",
            ));
        }
        self.check_native_mix()?;
        self.check_slots()?;

        let config = &self.context.config;
        let manifest = PackageManifest {
            manifest_version: PACKAGE_MANIFEST_VERSION,
            build_id: self.context.build_id.to_string(),
            components: self.components(),
            source_maps: self.source_maps(),
            sdk_version: config.sdk_version.as_ref().map(|sdk| SdkVersionInfo {
                device_api: sdk.device_api.clone(),
                companion_api: sdk.companion_api.clone(),
            }),
            requested_permissions: config.requested_permissions.clone(),
            app_id: config.app_uuid.to_string(),
        };

        tracing::info!(
            bundles = self.bundles.len(),
            build_id = %manifest.build_id,
            "package manifest written"
        );
        Ok(vec![manifest_record(&manifest)?])
    }
}

/// Append the package manifest to the stream of component bundles
pub fn package_manifest(input: RecordStream, context: ManifestContext) -> RecordStream {
    accumulate(input, PackageManifestBuilder::new(context))
}
