//! Record stream type and basic stages

use futures::stream::{self, BoxStream};
use futures::{Stream, TryStreamExt, future};
use wristkit_core::{BuildError, BuildResult, FileRecord};

/// Stream of file records; an `Err` item terminates the stream
pub type RecordStream = BoxStream<'static, BuildResult<FileRecord>>;

/// Box a stream of records
///
/// Also pins down the error type of `try_stream!` generators.
pub fn boxed<S>(stream: S) -> RecordStream
where
    S: Stream<Item = BuildResult<FileRecord>> + Send + 'static,
{
    Box::pin(stream)
}

/// Source stage emitting the given records in order
pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> RecordStream {
    let records: Vec<FileRecord> = records.into_iter().collect();
    boxed(stream::iter(records.into_iter().map(Ok)))
}

/// A stream that ends immediately
pub fn empty() -> RecordStream {
    boxed(stream::empty())
}

/// A stream that fails immediately with `error`
pub fn failed(error: BuildError) -> RecordStream {
    boxed(stream::once(future::ready(Err(error))))
}

/// Sink collecting every record, failing on the first error
pub async fn collect(stream: RecordStream) -> BuildResult<Vec<FileRecord>> {
    stream.try_collect().await
}

/// Materialize every lazy record into a buffer
pub fn buffered(input: RecordStream) -> RecordStream {
    boxed(input.and_then(FileRecord::into_buffered))
}

/// Apply a synchronous per-record transform; directories pass through
pub fn map_records<F>(input: RecordStream, mut transform: F) -> RecordStream
where
    F: FnMut(FileRecord) -> BuildResult<FileRecord> + Send + 'static,
{
    boxed(input.and_then(move |record| {
        future::ready(if record.is_directory() {
            Ok(record)
        } else {
            transform(record)
        })
    }))
}
