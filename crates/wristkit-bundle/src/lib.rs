//! Manifest synthesis and packaging for wristkit
//!
//! This crate provides the buffered-flush stages that close a build:
//! device, companion and package manifest synthesizers, the component
//! archiver, and a [`PackageLoader`] for reading a finished package back.
//!
//! # Package Structure
//!
//! ```text
//! app.fba
//! ├── manifest.json              # package manifest
//! ├── device-atlas.zip           # one archive per device family
//! │   ├── manifest.json          # device manifest
//! │   ├── app/index.js
//! │   ├── l/en-US                # compiled translation tables
//! │   └── resources/...
//! ├── companion.zip
//! │   ├── manifest.json          # companion manifest
//! │   ├── companion.js
//! │   └── settings.js
//! └── sourceMaps/
//!     ├── device/atlas/app/index.js.map
//!     └── companion/companion.js.map
//! ```

mod archive;
mod companion;
mod device;
mod error;
mod manifest;
mod package;
mod source_maps;

pub mod loader;

pub use archive::{ArchiveWriter, archive};
pub use companion::{CompanionManifestBuilder, companion_manifest};
pub use device::{DeviceManifestBuilder, device_manifest};
pub use error::BundleError;
pub use loader::PackageLoader;
pub use manifest::{
    CompanionComponent, CompanionManifest, Components, DeviceComponent, DeviceManifest,
    LocaleEntry, MainEntry, ManifestContext, PackageManifest, SdkVersionInfo, SourceMapIndex,
};
pub use package::{PackageManifestBuilder, package_manifest};
pub use source_maps::{emit_source_maps, source_map_path};

/// Result type for package reading operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Package file extension.
pub const PACKAGE_EXTENSION: &str = "fba";

/// Manifest file name within every archive.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Device manifest format version.
pub const DEVICE_MANIFEST_VERSION: u32 = 1;

/// Companion manifest format version.
pub const COMPANION_MANIFEST_VERSION: u32 = 2;

/// Package manifest format version.
pub const PACKAGE_MANIFEST_VERSION: u32 = 6;

/// Main view resource referenced by the device manifest.
pub const SVG_MAIN: &str = "resources/index.view";

/// Widget definitions referenced by the device manifest.
pub const SVG_WIDGETS: &str = "resources/widget.defs";

/// File name of the companion bundle inside the package.
pub const COMPANION_BUNDLE: &str = "companion.zip";

/// File name of a device bundle inside the package.
pub fn device_bundle_name(family: &str) -> String {
    format!("device-{family}.zip")
}
