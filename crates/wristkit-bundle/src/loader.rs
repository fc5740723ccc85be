//! Package loading utilities.
//!
//! The [`PackageLoader`] opens a built `.fba` package, validates its
//! manifest and gives read access to the component archives inside.

use crate::{BundleError, BundleResult, MANIFEST_FILE, PackageManifest};
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Loader for built packages.
///
/// # Example
///
/// ```no_run
/// use wristkit_bundle::PackageLoader;
///
/// let mut loader = PackageLoader::open("build/app.fba")?;
/// for file in loader.manifest().components.filenames() {
///     println!("{file}");
/// }
/// let device = loader.read_component_manifest("device-atlas.zip")?;
/// # Ok::<(), wristkit_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct PackageLoader {
    archive: ZipArchive<File>,
    manifest: PackageManifest,
}

impl PackageLoader {
    /// Open a package file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut archive = ZipArchive::new(file)?;

        let manifest = {
            let json = read_string(&mut archive, MANIFEST_FILE).map_err(|_| {
                BundleError::MissingFile(format!("{MANIFEST_FILE} not found in package"))
            })?;
            PackageManifest::from_json(&json)?
        };
        manifest.validate()?;

        let loader = Self { archive, manifest };
        for filename in loader.manifest.components.filenames() {
            if !loader.has_file(filename) {
                return Err(BundleError::MissingFile(format!(
                    "component listed in manifest is missing: {filename}"
                )));
            }
        }
        Ok(loader)
    }

    /// Get the package manifest.
    #[must_use]
    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    /// Read a file from the package as bytes.
    pub fn read_file(&mut self, path: &str) -> BundleResult<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in package: {path}")))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read a file from the package as a string.
    pub fn read_file_string(&mut self, path: &str) -> BundleResult<String> {
        read_string(&mut self.archive, path)
    }

    /// List all files in the package.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(String::from))
            .collect()
    }

    /// Check if a file exists in the package.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// List the files inside a component archive.
    pub fn component_files(&mut self, component: &str) -> BundleResult<Vec<String>> {
        let inner = ZipArchive::new(Cursor::new(self.read_file(component)?))?;
        Ok((0..inner.len())
            .filter_map(|i| inner.name_for_index(i).map(String::from))
            .collect())
    }

    /// Read the `manifest.json` of a component archive.
    pub fn read_component_manifest(&mut self, component: &str) -> BundleResult<serde_json::Value> {
        let mut inner = ZipArchive::new(Cursor::new(self.read_file(component)?))?;
        let json = read_string(&mut inner, MANIFEST_FILE).map_err(|_| {
            BundleError::MissingFile(format!("{MANIFEST_FILE} not found in {component}"))
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn read_string<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> BundleResult<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|_| BundleError::MissingFile(format!("File not found in package: {path}")))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

#[cfg(test)]
#[path = "loader/loader_tests.rs"]
mod loader_tests;
