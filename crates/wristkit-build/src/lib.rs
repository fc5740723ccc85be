//! wristkit-build - Build stages and orchestration
//!
//! This crate provides the format-specific stages of the build pipeline
//! and the [`ProjectBuilder`] that composes them:
//! - [`tagged_name`] and [`resources`]: `name~tag.ext` variants and disk sources
//! - [`entry_point`] and [`compile`]: entry resolution and the [`Compiler`] adapter
//! - [`minify`]: the post-compile [`JsMinifier`]
//! - [`transcode`] and [`txi`]: PNG to on-device image conversion
//! - [`i18n`]: `.po` to compiled message tables
//! - [`native`]: prebuilt ELF device components
//! - [`orchestrator`]: per-target sub-pipelines and final packaging

pub mod compile;
pub mod entry_point;
pub mod i18n;
pub mod minify;
pub mod native;
pub mod orchestrator;
pub mod resources;
pub mod tagged_name;
pub mod transcode;
pub mod txi;

pub use compile::{
    CommandCompiler, CompileOutput, CompileRequest, Compiler, ComponentCompiler, ComponentSpec,
};
pub use entry_point::EntryPointResolver;
pub use i18n::{TranslationCompiler, compile_translations};
pub use minify::{JsMinifier, MinifiedCode, Minifier, MinifyOptions, minify};
pub use native::{NativeComponentInfo, NativeComponents, load_native_components, read_native_info};
pub use orchestrator::{BuildOptions, BuildOutput, ProjectBuilder, check_project, package_file_name};
pub use resources::{ReadMode, TagFilter, filter_by_tag, read_file, read_tree};
pub use tagged_name::{TaggedName, split};
pub use transcode::{TranscodeOptions, transcode_images, transcode_png};
pub use txi::{PixelFormat, RleMode, TxiImage};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BuildOptions, BuildOutput, CommandCompiler, Compiler, ProjectBuilder, check_project,
    };
}
