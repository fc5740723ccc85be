//! Component compiler adapter
//!
//! The compiler itself is a black box behind the [`Compiler`] trait: it
//! turns one entry file into one output file plus diagnostics. This module
//! resolves entry points, drives the compiler, marks its output for the
//! manifest stages and runs the result through a [`Minifier`].

use crate::entry_point::EntryPointResolver;
use crate::minify::{Minifier, MinifyOptions, minify};
use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use wristkit_core::{
    BuildError, BuildResult, Category, ComponentType, Diagnostic, Diagnostics, FileRecord,
    SourceMap,
};
use wristkit_stream::{RecordStream, boxed};

/// Where a component's sources live and what it compiles to
#[derive(Debug, Clone, Copy)]
pub struct ComponentSpec {
    pub component: ComponentType,
    /// Entry files tried in order; exactly one may exist
    pub candidates: &'static [&'static str],
    /// Path of the compiled output inside the component bundle
    pub output: &'static str,
    /// Module names the compiler must leave unresolved
    pub externals: &'static [&'static str],
}

impl ComponentSpec {
    pub const DEVICE: ComponentSpec = ComponentSpec {
        component: ComponentType::Device,
        candidates: &["app/index.ts", "app/index.js"],
        output: "app/index.js",
        externals: &[
            "accelerometer",
            "appbit",
            "barometer",
            "body-presence",
            "clock",
            "crypto",
            "device",
            "display",
            "document",
            "exercise",
            "file-transfer",
            "fs",
            "geolocation",
            "gyroscope",
            "haptics",
            "heart-rate",
            "jpeg",
            "messaging",
            "orientation",
            "power",
            "scientific",
            "sensors",
            "system",
            "user-activity",
            "user-profile",
            "user-settings",
        ],
    };

    pub const COMPANION: ComponentSpec = ComponentSpec {
        component: ComponentType::Companion,
        candidates: &["companion/index.ts", "companion/index.js"],
        output: "companion.js",
        externals: &[
            "app-cluster-storage",
            "calendars",
            "companion",
            "device",
            "external-app",
            "file-transfer",
            "geolocation",
            "local-storage",
            "messaging",
            "permissions",
            "settings",
            "weather",
        ],
    };

    pub const SETTINGS: ComponentSpec = ComponentSpec {
        component: ComponentType::Settings,
        candidates: &["settings/index.tsx", "settings/index.jsx"],
        output: "settings.js",
        externals: &["user-settings"],
    };
}

/// One invocation of the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Project root; `entry` is relative to it
    pub root: PathBuf,
    pub entry: String,
    pub output_name: String,
    pub component: ComponentType,
    /// Device family, for per-target device builds
    pub target: Option<String>,
    pub externals: Vec<String>,
}

/// What the compiler produced
#[derive(Debug, Default)]
pub struct CompileOutput {
    pub records: Vec<FileRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.category == Category::Error)
    }
}

/// Compiles one entry file to one output file
#[async_trait]
pub trait Compiler: Send + Sync + fmt::Debug {
    /// Compile `request`.
    ///
    /// Problems in the user's code are reported as error diagnostics, not
    /// as `Err`. `Err` means the compiler could not run at all.
    async fn compile(&self, request: CompileRequest) -> BuildResult<CompileOutput>;
}

/// Runs an external compiler program.
///
/// The program is invoked from the project root as
/// `<program> <args..> --entry <file> --out <file> [--target <family>] [--external <name>]..`
/// and must write the output file plus an optional `<out>.map` next to it.
/// Diagnostics are read from stderr, one per line, in the form
/// `[file:line:column: ]error|warning|message: text`; indented lines
/// continue the previous diagnostic.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: PathBuf,
    args: Vec<String>,
    work_dir: Option<PathBuf>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: None,
        }
    }

    /// Arguments placed before the generated ones
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Directory for intermediate outputs; defaults to `<root>/.wristkit`
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    fn output_dir(&self, request: &CompileRequest) -> PathBuf {
        let base = self
            .work_dir
            .clone()
            .unwrap_or_else(|| request.root.join(".wristkit"));
        match &request.target {
            Some(target) => base.join(format!("{}-{target}", request.component)),
            None => base.join(request.component.as_str()),
        }
    }
}

#[async_trait]
impl Compiler for CommandCompiler {
    async fn compile(&self, request: CompileRequest) -> BuildResult<CompileOutput> {
        let out_dir = self.output_dir(&request);
        let out_file = out_dir.join(&request.output_name);
        if let Some(parent) = out_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--entry")
            .arg(request.root.join(&request.entry))
            .arg("--out")
            .arg(&out_file)
            .current_dir(&request.root)
            .kill_on_drop(true);
        if let Some(target) = &request.target {
            command.arg("--target").arg(target);
        }
        for external in &request.externals {
            command.arg("--external").arg(external);
        }

        tracing::debug!(
            program = %self.program.display(),
            entry = %request.entry,
            component = %request.component,
            "running compiler"
        );
        let output = command.output().await.map_err(|e| {
            BuildError::ToolUnavailable(format!(
                "failed to run {}: {e}",
                self.program.display()
            ))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diagnostics = parse_compiler_output(&stderr, request.component);
        if !output.status.success() && !diagnostics.iter().any(|d| d.category == Category::Error) {
            diagnostics.push(
                Diagnostic::error(format!("Compiler exited with {}", output.status))
                    .with_target(request.component),
            );
        }

        let mut result = CompileOutput {
            records: Vec::new(),
            diagnostics,
        };
        if result.has_errors() {
            return Ok(result);
        }

        let code = tokio::fs::read(&out_file).await.map_err(|e| {
            BuildError::ToolUnavailable(format!(
                "compiler produced no {}: {e}",
                request.output_name
            ))
        })?;
        let mut record = FileRecord::buffer(request.output_name.as_str(), code);
        let map_file = append_extension(&out_file, "map");
        if let Ok(map) = tokio::fs::read(&map_file).await {
            record.metadata.source_map = Some(SourceMap {
                contents: Bytes::from(map),
            });
        }
        result.records.push(record);
        Ok(result)
    }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

static DIAGNOSTIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<file>[^:\s][^:]*):(?P<line>\d+):(?P<column>\d+): )?(?P<category>error|warning|message): (?P<text>.*)$")
        .unwrap_or_else(|e| panic!("BUG: invalid diagnostic pattern: {e}"))
});

/// Parse compiler stderr into diagnostics
pub(crate) fn parse_compiler_output(stderr: &str, component: ComponentType) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for line in stderr.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push(line.trim().to_string());
                continue;
            }
        }
        let Some(captures) = DIAGNOSTIC_LINE.captures(line) else {
            tracing::debug!(%component, line, "compiler output");
            continue;
        };

        let category = match &captures["category"] {
            "error" => Category::Error,
            "warning" => Category::Warning,
            _ => Category::Message,
        };
        let mut diagnostic =
            Diagnostic::new(category, &captures["text"]).with_target(component);
        if let Some(file) = captures.name("file") {
            let line = captures["line"].parse().unwrap_or(0);
            let column = captures["column"].parse().unwrap_or(0);
            diagnostic = diagnostic.with_position(file.as_str(), line, column);
        }
        diagnostics.push(diagnostic);
    }
    diagnostics
}

/// Resolves, compiles and minifies one component
#[derive(Debug, Clone)]
pub struct ComponentCompiler {
    root: PathBuf,
    compiler: Arc<dyn Compiler>,
    minifier: Arc<dyn Minifier>,
    options: MinifyOptions,
    diagnostics: Diagnostics,
}

impl ComponentCompiler {
    pub fn new(
        root: impl Into<PathBuf>,
        compiler: Arc<dyn Compiler>,
        minifier: Arc<dyn Minifier>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            root: root.into(),
            compiler,
            minifier,
            options: MinifyOptions::default(),
            diagnostics,
        }
    }

    pub fn with_options(mut self, options: MinifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Build `spec` for `target`.
    ///
    /// Returns `Ok(None)` when the entry point is optional and absent.
    /// Error diagnostics from the compiler fail the returned stream.
    pub fn compile(
        &self,
        spec: &ComponentSpec,
        target: Option<&str>,
        not_found_is_fatal: bool,
    ) -> BuildResult<Option<RecordStream>> {
        let resolver = EntryPointResolver::new(&self.root);
        let Some(entry) = resolver.resolve(
            spec.candidates,
            not_found_is_fatal,
            spec.component,
            &self.diagnostics,
        )?
        else {
            return Ok(None);
        };

        let request = CompileRequest {
            root: self.root.clone(),
            entry,
            output_name: spec.output.to_string(),
            component: spec.component,
            target: target.map(str::to_string),
            externals: spec.externals.iter().map(|e| e.to_string()).collect(),
        };
        let compiler = Arc::clone(&self.compiler);
        let diagnostics = self.diagnostics.clone();

        let compiled = boxed(try_stream! {
            let output_name = request.output_name.clone();
            let component = request.component;
            let output = compiler.compile(request).await?;
            let failed = output.has_errors();
            let first_error = output
                .diagnostics
                .iter()
                .find(|d| d.category == Category::Error)
                .map(|d| d.primary().to_string());
            diagnostics.extend(output.diagnostics);
            if failed {
                Err::<(), _>(BuildError::Compiler(format!(
                    "{component}: {}",
                    first_error.unwrap_or_default()
                )))?;
            }

            for mut record in output.records {
                record.metadata.component = Some(component);
                if record.path() == output_name {
                    record.metadata.entry_point = true;
                }
                yield record;
            }
            tracing::info!(%component, "component compiled");
        });

        Ok(Some(minify(compiled, Arc::clone(&self.minifier), self.options)))
    }
}
