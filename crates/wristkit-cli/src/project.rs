//! Project and build target loading shared by the commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use wristkit_core::{BuildTargetRegistry, Diagnostics, PROJECT_CONFIG_FILE, ProjectConfig};
use wristkit_logging::{DiagnosticRenderer, summary};

/// A project as read from disk
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub targets: BuildTargetRegistry,
}

/// Read `wristkit.toml` under `path` and the optional target overrides
pub fn load(path: Option<&Path>, targets_file: Option<&Path>) -> Result<Project> {
    let root = path.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let config_file = root.join(PROJECT_CONFIG_FILE);
    if !config_file.is_file() {
        anyhow::bail!("No {PROJECT_CONFIG_FILE} found in {}", root.display());
    }
    let config = ProjectConfig::load(&config_file)
        .with_context(|| format!("Failed to load {}", config_file.display()))?;

    Ok(Project {
        root,
        config,
        targets: load_targets(targets_file)?,
    })
}

/// Built-in targets merged with an optional override file
pub fn load_targets(targets_file: Option<&Path>) -> Result<BuildTargetRegistry> {
    let registry = BuildTargetRegistry::builtin();
    let Some(file) = targets_file else {
        return Ok(registry);
    };
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read targets file: {}", file.display()))?;
    registry
        .with_overrides_toml(&content)
        .with_context(|| format!("Failed to parse targets file: {}", file.display()))
}

/// Print every diagnostic to stderr followed by a count
pub fn report(diagnostics: &Diagnostics, colors: bool) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let renderer = DiagnosticRenderer::new().with_colors(colors);
    renderer
        .write_all(diagnostics, &mut io::stderr().lock())
        .context("Failed to write diagnostics")?;

    let line = summary(diagnostics);
    if colors {
        eprintln!("{}", line.bold());
    } else {
        eprintln!("{line}");
    }
    Ok(())
}
