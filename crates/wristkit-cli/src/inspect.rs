//! Inspect command implementation

use anyhow::{Context, Result};
use std::path::Path;
use wristkit_bundle::PackageLoader;

/// Print the package manifest and a summary of every component
pub fn run(package: &Path, files: bool) -> Result<()> {
    let mut loader = PackageLoader::open(package)
        .with_context(|| format!("Failed to open package: {}", package.display()))?;
    let manifest = loader.manifest().clone();

    println!("Package: {}", package.display());
    println!("App id: {}", manifest.app_id);
    println!("Build id: {}", manifest.build_id);
    if let Some(sdk) = &manifest.sdk_version {
        println!(
            "SDK: device api {}, companion api {}",
            sdk.device_api, sdk.companion_api
        );
    }

    println!("\nComponents:");
    for (family, component) in &manifest.components.device {
        println!(
            "  device {family}: {} ({})",
            component.filename,
            component.platform.join(", ")
        );
        describe(&mut loader, &component.filename, files)?;
    }
    if let Some(companion) = &manifest.components.companion {
        println!("  companion: {}", companion.filename);
        describe(&mut loader, &companion.filename, files)?;
    }

    let maps = manifest.source_maps.device.values().map(|m| m.len()).sum::<usize>()
        + manifest.source_maps.companion.len()
        + manifest.source_maps.settings.len();
    println!("\nSource maps: {maps}");
    Ok(())
}

fn describe(loader: &mut PackageLoader, filename: &str, files: bool) -> Result<()> {
    // native device bundles are not zip archives
    if !filename.ends_with(".zip") {
        return Ok(());
    }

    let component = loader
        .read_component_manifest(filename)
        .with_context(|| format!("Failed to read manifest of {filename}"))?;
    for key in ["main", "apiVersion"] {
        if let Some(value) = component.get(key).and_then(|v| v.as_str()) {
            println!("    {key}: {value}");
        }
    }
    for role in ["companion", "settings"] {
        if let Some(main) = component.pointer(&format!("/{role}/main")).and_then(|v| v.as_str()) {
            println!("    {role}: {main}");
        }
    }

    if files {
        for file in loader.component_files(filename)? {
            println!("      {file}");
        }
    }
    Ok(())
}
