//! Resource sources and the per-target tag filter

use crate::tagged_name::split;
use async_stream::try_stream;
use futures::{StreamExt, TryStreamExt, stream};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use walkdir::WalkDir;
use wristkit_core::{BuildError, BuildResult, FileRecord};
use wristkit_stream::{Accumulator, RecordStream, accumulate, boxed};

/// How a disk source materializes file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Read each file fully before emitting it
    #[default]
    Buffer,
    /// Emit a lazy stream; the file is opened on first read
    Stream,
}

/// Keeps, per untagged name, the variant matching one tag.
///
/// A variant tagged with the requested tag always wins. An untagged file
/// is kept only until a matching variant shows up. Variants tagged for
/// anything else are dropped.
#[derive(Debug)]
pub struct TagFilter {
    tag: String,
    selected: IndexMap<String, FileRecord>,
}

impl TagFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            selected: IndexMap::new(),
        }
    }
}

impl Accumulator for TagFilter {
    fn name(&self) -> &'static str {
        "resource-filter"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        let name = split(record.file_name())?;
        let output = match record.parent() {
            Some(parent) => format!("{parent}/{}", name.basename()),
            None => name.basename(),
        };

        match name.tag.as_deref() {
            Some(tag) if tag == self.tag => {
                self.selected.insert(output, record);
            }
            None if !self.selected.contains_key(&output) => {
                self.selected.insert(output, record);
            }
            _ => tracing::debug!(path = %record.path(), tag = %self.tag, "resource variant dropped"),
        }
        Ok(None)
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        Ok(self
            .selected
            .into_iter()
            .map(|(output, mut record)| {
                record.set_path(output);
                record
            })
            .collect())
    }
}

/// Select the resource variants for `tag` and strip tags from their names
pub fn filter_by_tag(input: RecordStream, tag: impl Into<String>) -> RecordStream {
    accumulate(input, TagFilter::new(tag))
}

/// Read one file below `root` into a record named by its relative path
pub async fn read_file(root: &Path, relative: &str, mode: ReadMode) -> BuildResult<FileRecord> {
    let path = root.join(relative);
    match mode {
        ReadMode::Buffer => {
            let contents = tokio::fs::read(&path).await.map_err(|e| {
                BuildError::fatal_at("read", relative, format!("cannot read file: {e}"))
            })?;
            Ok(FileRecord::buffer(relative, contents))
        }
        ReadMode::Stream => {
            let lazy = stream::once(tokio::fs::File::open(path))
                .map_ok(ReaderStream::new)
                .try_flatten()
                .boxed();
            Ok(FileRecord::stream(relative, lazy))
        }
    }
}

/// Source stage emitting every file below `root/dir`, in path order.
///
/// A missing directory yields an empty stream.
pub fn read_tree(root: impl Into<PathBuf>, dir: impl Into<String>, mode: ReadMode) -> RecordStream {
    let root = root.into();
    let dir = dir.into();
    boxed(try_stream! {
        let listing_root = root.clone();
        let listing = tokio::task::spawn_blocking(move || list_files(&listing_root, &dir))
            .await
            .map_err(|e| BuildError::internal(format!("file listing task failed: {e}")))?;
        let files = listing?;

        tracing::debug!(count = files.len(), root = %root.display(), "files listed");
        for relative in files {
            yield read_file(&root, &relative, mode).await?;
        }
    })
}

fn list_files(root: &Path, dir: &str) -> BuildResult<Vec<String>> {
    let base = root.join(dir);
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| BuildError::fatal("read", format!("cannot list {dir}: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| BuildError::internal(e.to_string()))?;
        files.push(relative.to_string_lossy().replace('\\', "/"));
    }
    Ok(files)
}
