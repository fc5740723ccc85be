//! wristkit-stream - Stream composition primitives
//!
//! This crate provides:
//! - [`RecordStream`], the boxed stream of [`FileRecord`]s every stage consumes
//!   and produces
//! - [`Accumulator`] and [`accumulate`] for buffered-flush stages
//! - [`merge`] to fan in independent sub-pipelines
//! - Guard stages: duplicate detection, required files, size limits
//! - [`PipelineRuntime`] for driving a pipeline from sync code
//!
//! [`FileRecord`]: wristkit_core::FileRecord

mod accumulate;
mod guards;
mod merge;
mod runtime;
mod stream;

pub use accumulate::{Accumulator, accumulate};
pub use guards::{
    DuplicateDetector, RequiredFiles, SizeLimit, detect_duplicates, format_size, require_files,
    validate_sizes,
};
pub use merge::{DEFAULT_MERGE_CAPACITY, merge, merge_with_capacity};
pub use runtime::{PipelineRuntime, RuntimeConfig};
pub use stream::{RecordStream, boxed, buffered, collect, empty, failed, from_records, map_records};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Accumulator, RecordStream, accumulate, boxed, collect, from_records, merge};
}
