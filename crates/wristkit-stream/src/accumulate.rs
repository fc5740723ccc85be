//! Buffered-flush stages
//!
//! An [`Accumulator`] sees every record once, may hold it back or pass it
//! on, and produces its synthesized output when the input ends. The
//! [`accumulate`] shim adapts it to a stream stage.

use crate::{RecordStream, boxed};
use async_stream::try_stream;
use futures::StreamExt;
use wristkit_core::{BuildResult, FileRecord};

/// Two-phase stage: observe each record, then finish once.
pub trait Accumulator: Send + 'static {
    /// Stage name used to attribute errors and log lines
    fn name(&self) -> &'static str;

    /// Observe a non-directory record.
    ///
    /// Return `Some` to pass the record downstream immediately, `None` to
    /// keep it until [`finish`](Accumulator::finish).
    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>>;

    /// Validate everything observed and return the records to emit last.
    fn finish(self) -> BuildResult<Vec<FileRecord>>;
}

/// Run `accumulator` over `input`.
///
/// Directory records bypass the accumulator. Nothing from `finish` is
/// emitted before the input has ended.
pub fn accumulate<A: Accumulator>(input: RecordStream, accumulator: A) -> RecordStream {
    boxed(try_stream! {
        let mut input = input;
        let mut accumulator = accumulator;
        while let Some(record) = input.next().await {
            let record = record?;
            if record.is_directory() {
                yield record;
                continue;
            }
            if let Some(passed) = accumulator.observe(record)? {
                yield passed;
            }
        }

        let stage = accumulator.name();
        let flushed = accumulator.finish()?;
        tracing::debug!(stage, count = flushed.len(), "flushed");
        for record in flushed {
            yield record;
        }
    })
}
