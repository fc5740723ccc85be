//! Check command implementation

use crate::project::{self, report};
use anyhow::Result;
use std::path::PathBuf;
use wristkit_build::{ComponentSpec, EntryPointResolver, check_project};
use wristkit_core::Diagnostics;

/// Validate the configuration and look for entry points without compiling
pub fn run(path: Option<PathBuf>, targets_file: Option<PathBuf>, colors: bool) -> Result<()> {
    let project = project::load(path.as_deref(), targets_file.as_deref())?;
    let diagnostics = Diagnostics::new();

    let checked = check_project(&project.config, &project.targets, &diagnostics);

    let resolver = EntryPointResolver::new(&project.root);
    let device_required = !project.config.has_native_components();
    let mut entries = Vec::new();
    for (spec, required) in [
        (ComponentSpec::DEVICE, device_required),
        (ComponentSpec::COMPANION, false),
        (ComponentSpec::SETTINGS, false),
    ] {
        match resolver.resolve(spec.candidates, required, spec.component, &diagnostics) {
            Ok(Some(entry)) => entries.push((spec.component, entry)),
            Ok(None) => {}
            Err(e) => diagnostics.push(
                wristkit_core::Diagnostic::error(e.to_string()).with_target(spec.component),
            ),
        }
    }

    report(&diagnostics, colors)?;
    if let Err(e) = checked {
        anyhow::bail!("{e}");
    }
    if diagnostics.fatal_error() {
        anyhow::bail!("Project check failed");
    }

    println!("✓ {} is valid", project.config.name);
    for target in &project.config.build_targets {
        if let Some(descriptor) = project.targets.get(target) {
            println!(
                "  target {target}: api {}, resources ~{}",
                descriptor.api_version, descriptor.resource_filter_tag
            );
        }
    }
    for (component, entry) in entries {
        println!("  {component}: {entry}");
    }
    Ok(())
}
