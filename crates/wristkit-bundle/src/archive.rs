//! Component and package archiver.
//!
//! [`archive`] materializes every record, rejects duplicate paths, and
//! writes a single zip container as the only output record. Entries are
//! written in path order with a fixed timestamp so identical inputs give
//! identical archives.

use bytes::Bytes;
use futures::{TryStreamExt, future};
use std::io::{Cursor, Write};
use wristkit_core::{
    BuildError, BuildResult, BundleKind, BundleTag, ComponentType, Contents, FileRecord, Metadata,
    SourceMapFile,
};
use wristkit_stream::{Accumulator, RecordStream, accumulate, boxed, buffered, detect_duplicates};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Collects buffered records and writes them into one zip file.
#[derive(Debug)]
pub struct ArchiveWriter {
    output: String,
    kind: Option<BundleKind>,
    entries: Vec<(String, Bytes)>,
    source_maps: Vec<SourceMapFile>,
}

impl ArchiveWriter {
    /// `kind` tags the output as a component bundle for the package stage
    pub fn new(output: impl Into<String>, kind: Option<BundleKind>) -> Self {
        Self {
            output: output.into(),
            kind,
            entries: Vec::new(),
            source_maps: Vec::new(),
        }
    }

    fn default_component(&self) -> ComponentType {
        match self.kind {
            Some(BundleKind::Companion) => ComponentType::Companion,
            _ => ComponentType::Device,
        }
    }

    fn write_zip(&mut self) -> BuildResult<Bytes> {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);

        self.entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, contents) in &self.entries {
            zip.start_file(path.as_str(), options)
                .map_err(|e| BuildError::Archive(format!("{path}: {e}")))?;
            zip.write_all(contents)?;
        }
        let cursor = zip
            .finish()
            .map_err(|e| BuildError::Archive(e.to_string()))?;
        Ok(Bytes::from(cursor.into_inner()))
    }
}

impl Accumulator for ArchiveWriter {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn observe(&mut self, mut record: FileRecord) -> BuildResult<Option<FileRecord>> {
        if let Some(map) = record.metadata.source_map.take() {
            let component = record
                .metadata
                .component
                .unwrap_or_else(|| self.default_component());
            self.source_maps.push(SourceMapFile {
                component,
                file: record.path().to_string(),
                contents: map.contents,
            });
        }

        let contents = match record.take_contents() {
            Contents::Buffer(bytes) => bytes,
            Contents::Null => Bytes::new(),
            Contents::Stream(_) => {
                return Err(BuildError::internal(format!(
                    "{} reached the archiver unbuffered",
                    record.path()
                )));
            }
        };
        self.entries.push((record.path().to_string(), contents));
        Ok(None)
    }

    fn finish(mut self) -> BuildResult<Vec<FileRecord>> {
        let bytes = self.write_zip()?;
        tracing::info!(
            archive = %self.output,
            files = self.entries.len(),
            size = bytes.len(),
            "archive written"
        );

        let metadata = Metadata {
            bundle: self.kind.map(|kind| BundleTag {
                kind,
                source_maps: self.source_maps,
            }),
            ..Metadata::default()
        };
        Ok(vec![FileRecord::buffer(self.output, bytes).with_metadata(metadata)])
    }
}

/// Zip every record of `input` into a single record named `output`
pub fn archive(
    input: RecordStream,
    output: impl Into<String>,
    kind: Option<BundleKind>,
) -> RecordStream {
    let files = boxed(buffered(input).try_filter(|record| future::ready(!record.is_directory())));
    accumulate(detect_duplicates(files), ArchiveWriter::new(output, kind))
}

#[cfg(test)]
#[path = "archive/archive_tests.rs"]
mod archive_tests;
