//! Top-level build orchestration
//!
//! A build fans out into one sub-pipeline per device family plus one for
//! the companion, merges the resulting bundles and funnels them through
//! the package manifest into the final archive:
//!
//! ```text
//! per device family:
//!   compile ───────────────────────┐
//!   resources ─ filter ─ transcode ├─ merge ─ device manifest ─ required files ─ size limits ─ zip
//!   translations ──────────────────┘
//! companion:
//!   companion, settings ─ merge ─ companion manifest ─ zip
//! package:
//!   device zips, companion zip, native bundles ─ merge ─ source maps ─ package manifest ─ zip
//! ```

use crate::compile::{ComponentCompiler, ComponentSpec, Compiler};
use crate::entry_point::EntryPointResolver;
use crate::minify::{JsMinifier, Minifier, MinifyOptions};
use crate::i18n::compile_translations;
use crate::native::load_native_components;
use crate::resources::{ReadMode, filter_by_tag, read_tree};
use crate::transcode::{TranscodeOptions, transcode_images};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wristkit_bundle::{
    COMPANION_BUNDLE, ManifestContext, PACKAGE_EXTENSION, SVG_MAIN, SVG_WIDGETS, archive,
    companion_manifest, device_bundle_name, device_manifest, emit_source_maps, package_manifest,
};
use wristkit_core::{
    BuildError, BuildId, BuildResult, BuildTargetDescriptor, BuildTargetRegistry, BundleKind,
    Category, ComponentType, Diagnostic, Diagnostics, ProjectConfig,
};
use wristkit_stream::{
    DEFAULT_MERGE_CAPACITY, RecordStream, SizeLimit, accumulate, buffered, collect, from_records,
    merge_with_capacity, require_files,
};

/// Directory below the project root holding device resources
pub const RESOURCES_DIR: &str = "resources";

/// Directory below the project root holding `.po` files
pub const TRANSLATIONS_DIR: &str = "i18n";

/// File name of the finished package
pub fn package_file_name() -> String {
    format!("app.{PACKAGE_EXTENSION}")
}

/// Tunables for one build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub transcode: TranscodeOptions,
    pub minify: MinifyOptions,
    /// Channel capacity of every merge point
    pub merge_capacity: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            transcode: TranscodeOptions::default(),
            minify: MinifyOptions::default(),
            merge_capacity: DEFAULT_MERGE_CAPACITY,
        }
    }
}

/// A finished package
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub build_id: BuildId,
    pub package: Bytes,
}

/// Validate the project configuration before anything is built.
///
/// Every problem is pushed to `diagnostics`; any error among them fails the
/// check.
pub fn check_project(
    config: &ProjectConfig,
    targets: &BuildTargetRegistry,
    diagnostics: &Diagnostics,
) -> BuildResult<()> {
    let problems = config.validate(targets);
    let errors = problems
        .iter()
        .filter(|d| d.category == Category::Error)
        .count();
    diagnostics.extend(problems);

    if errors > 0 {
        return Err(BuildError::Config(format!(
            "project configuration has {errors} error(s)"
        )));
    }
    Ok(())
}

/// Builds one project into a package
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    root: PathBuf,
    config: Arc<ProjectConfig>,
    targets: BuildTargetRegistry,
    compiler: Arc<dyn Compiler>,
    minifier: Arc<dyn Minifier>,
    diagnostics: Diagnostics,
    options: BuildOptions,
    bundle_date: Option<String>,
}

impl ProjectBuilder {
    pub fn new(
        root: impl Into<PathBuf>,
        config: ProjectConfig,
        targets: BuildTargetRegistry,
        compiler: Arc<dyn Compiler>,
    ) -> Self {
        Self {
            root: root.into(),
            config: Arc::new(config),
            targets,
            compiler,
            minifier: Arc::new(JsMinifier),
            diagnostics: Diagnostics::new(),
            options: BuildOptions::default(),
            bundle_date: None,
        }
    }

    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Share an existing diagnostics log
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Pin the manifest bundle date
    pub fn with_bundle_date(mut self, date: impl Into<String>) -> Self {
        self.bundle_date = Some(date.into());
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Run the whole build and return the package bytes.
    ///
    /// Nothing is written to disk. A project error that has not already
    /// produced an error diagnostic is recorded as one; toolchain failures
    /// are only logged.
    pub async fn build(&self) -> BuildResult<BuildOutput> {
        let result = self.run().await;
        if let Err(err) = &result {
            self.record_failure(err);
        }
        result
    }

    fn record_failure(&self, err: &BuildError) {
        if !err.is_project_error() {
            tracing::error!(error = %err, "toolchain failure");
            return;
        }
        if !self.diagnostics.fatal_error() {
            self.diagnostics.push(Diagnostic::error(err.to_string()));
        }
    }

    async fn run(&self) -> BuildResult<BuildOutput> {
        check_project(&self.config, &self.targets, &self.diagnostics)?;

        let native = if self.config.has_native_components() {
            Some(
                load_native_components(
                    &self.root,
                    &self.config.native_components,
                    self.config.app_uuid,
                )
                .await?,
            )
        } else {
            None
        };
        let build_id = native
            .as_ref()
            .map_or_else(BuildId::generate, |native| native.build_id);
        tracing::info!(%build_id, name = %self.config.name, "build started");

        let mut context =
            ManifestContext::new(Arc::clone(&self.config), build_id, self.diagnostics.clone());
        if let Some(date) = &self.bundle_date {
            context = context.with_bundle_date(date.as_str());
        }

        let mut bundles = Vec::new();
        let has_device_code = self.has_device_entry(native.is_none())?;
        if let Some(native) = native {
            bundles.push(from_records(native.records));
        }
        if has_device_code {
            for target in self.targets.resolve(&self.config.build_targets)? {
                bundles.push(self.device_bundle(&target, context.clone())?);
            }
        }
        if let Some(bundle) = self.companion_bundle(context.clone())? {
            bundles.push(bundle);
        }

        let merged = merge_with_capacity(bundles, self.options.merge_capacity);
        let package = archive(
            package_manifest(emit_source_maps(merged), context),
            package_file_name(),
            None,
        );

        let mut records = collect(package).await?;
        let record = match (records.pop(), records.is_empty()) {
            (Some(record), true) => record,
            _ => return Err(BuildError::internal("package stage must emit exactly one archive")),
        };
        let package = record
            .bytes()
            .cloned()
            .ok_or_else(|| BuildError::internal("package archive is not buffered"))?;

        tracing::info!(%build_id, size = package.len(), "build finished");
        Ok(BuildOutput { build_id, package })
    }

    /// Build and write `app.fba` into `dir`.
    ///
    /// The file is only written when the whole build succeeded.
    pub async fn build_to(&self, dir: &Path) -> BuildResult<(BuildOutput, PathBuf)> {
        let output = self.build().await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(package_file_name());
        tokio::fs::write(&path, &output.package).await?;
        tracing::info!(path = %path.display(), "package written");
        Ok((output, path))
    }

    fn component_compiler(&self) -> ComponentCompiler {
        ComponentCompiler::new(
            &self.root,
            Arc::clone(&self.compiler),
            Arc::clone(&self.minifier),
            self.diagnostics.clone(),
        )
        .with_options(self.options.minify)
    }

    /// Resolve the device entry point once for every family.
    ///
    /// Without native components a missing entry is fatal; with them it
    /// produces a single warning and no JavaScript device bundles.
    fn has_device_entry(&self, required: bool) -> BuildResult<bool> {
        let entry = EntryPointResolver::new(&self.root).resolve(
            ComponentSpec::DEVICE.candidates,
            required,
            ComponentType::Device,
            &self.diagnostics,
        )?;
        Ok(entry.is_some())
    }

    /// Device bundle for one family
    fn device_bundle(
        &self,
        target: &BuildTargetDescriptor,
        context: ManifestContext,
    ) -> BuildResult<RecordStream> {
        let code = self
            .component_compiler()
            .compile(&ComponentSpec::DEVICE, Some(&target.name), true)?
            .ok_or_else(|| BuildError::internal("required device entry point resolved to nothing"))?;

        let resources = transcode_images(
            filter_by_tag(
                read_tree(&self.root, RESOURCES_DIR, ReadMode::Stream),
                target.resource_filter_tag.as_str(),
            ),
            self.options.transcode,
        );
        let translations = compile_translations(
            read_tree(&self.root, TRANSLATIONS_DIR, ReadMode::Buffer),
            &self.config.default_language,
        );

        let merged = merge_with_capacity(
            vec![code, resources, translations],
            self.options.merge_capacity,
        );
        let with_manifest = device_manifest(merged, context, target.clone());
        let checked = require_files(with_manifest, [SVG_MAIN, SVG_WIDGETS]);
        let sized = accumulate(
            buffered(checked),
            SizeLimit::new(target.size_limits.clone(), self.diagnostics.clone())
                .with_target(ComponentType::Device),
        );

        tracing::debug!(family = %target.name, "device pipeline assembled");
        Ok(archive(
            sized,
            device_bundle_name(&target.name),
            Some(BundleKind::Device {
                family: target.name.clone(),
                platform: target.platform.clone(),
                native: false,
            }),
        ))
    }

    /// Companion bundle, or `None` when neither companion nor settings exist
    fn companion_bundle(&self, context: ManifestContext) -> BuildResult<Option<RecordStream>> {
        let compiler = self.component_compiler();
        let parts: Vec<RecordStream> = [ComponentSpec::COMPANION, ComponentSpec::SETTINGS]
            .iter()
            .map(|spec| compiler.compile(spec, None, false))
            .collect::<BuildResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }

        let merged = merge_with_capacity(parts, self.options.merge_capacity);
        Ok(Some(archive(
            companion_manifest(merged, context),
            COMPANION_BUNDLE,
            Some(BundleKind::Companion),
        )))
    }
}
