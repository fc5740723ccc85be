//! File records flowing through the pipeline
//!
//! A [`FileRecord`] carries a relative path, its contents and a typed
//! [`Metadata`] side channel. Contents are either fully materialized
//! ([`Contents::Buffer`]), produced lazily ([`Contents::Stream`]), or absent
//! ([`Contents::Null`]) for metadata-only records.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BuildResult;

/// Lazily produced file contents
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Logical application component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Device,
    Companion,
    Settings,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Device => "device",
            ComponentType::Companion => "companion",
            ComponentType::Settings => "settings",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source map attached to a compiled record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    pub contents: Bytes,
}

/// A source map lifted out of a component archive, waiting to be placed
/// next to the archive in the outer package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMapFile {
    pub component: ComponentType,
    /// Path of the compiled file inside the component archive
    pub file: String,
    pub contents: Bytes,
}

/// What kind of component bundle an archive record is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleKind {
    Device {
        family: String,
        platform: Vec<String>,
        native: bool,
    },
    Companion,
}

impl BundleKind {
    /// `(type, family)` pair used for uniqueness checks
    pub fn slot(&self) -> (&'static str, Option<&str>) {
        match self {
            BundleKind::Device { family, .. } => ("device", Some(family.as_str())),
            BundleKind::Companion => ("companion", None),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, BundleKind::Device { native: true, .. })
    }
}

/// Descriptor attached to an archived component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleTag {
    pub kind: BundleKind,
    pub source_maps: Vec<SourceMapFile>,
}

impl BundleTag {
    pub fn new(kind: BundleKind) -> Self {
        Self {
            kind,
            source_maps: Vec::new(),
        }
    }
}

/// Typed side channel carried by every record.
///
/// Each field is owned by the stage that documents it:
/// - `component` and `entry_point`: compiler adapter
/// - `source_map`: compiler adapter, consumed by the archiver
/// - `translation_language`: translation compiler
/// - `bundle`: archiver and native-component reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub component: Option<ComponentType>,
    pub entry_point: bool,
    pub translation_language: Option<String>,
    pub source_map: Option<SourceMap>,
    pub bundle: Option<BundleTag>,
}

/// Contents of a file record
pub enum Contents {
    Buffer(Bytes),
    Stream(ByteStream),
    Null,
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Contents::Stream(_) => f.write_str("Stream"),
            Contents::Null => f.write_str("Null"),
        }
    }
}

/// The unit of data flowing through the pipeline
#[derive(Debug)]
pub struct FileRecord {
    path: String,
    contents: Contents,
    is_directory: bool,
    pub metadata: Metadata,
}

impl FileRecord {
    /// Create a record with materialized contents
    pub fn buffer(path: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self::with_contents(path, Contents::Buffer(contents.into()))
    }

    /// Create a record whose contents are produced lazily
    pub fn stream(path: impl Into<String>, contents: ByteStream) -> Self {
        Self::with_contents(path, Contents::Stream(contents))
    }

    /// Create a metadata-only record
    pub fn null(path: impl Into<String>) -> Self {
        Self::with_contents(path, Contents::Null)
    }

    /// Create a directory record
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            contents: Contents::Null,
            is_directory: true,
            metadata: Metadata::default(),
        }
    }

    fn with_contents(path: impl Into<String>, contents: Contents) -> Self {
        Self {
            path: normalize_path(&path.into()),
            contents,
            is_directory: false,
            metadata: Metadata::default(),
        }
    }

    /// Attach metadata (builder style)
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Relative, `/`-separated path
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = normalize_path(&path.into());
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Directory part of the path, without trailing slash
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(dir, _)| dir)
    }

    /// File name without its last extension
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }

    /// Lower-cased extension without the dot
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext.to_ascii_lowercase()),
            _ => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    /// Materialized bytes, if the record is buffered
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Size in bytes when known
    pub fn len(&self) -> Option<usize> {
        self.bytes().map(Bytes::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Take the contents out, leaving a null marker behind
    pub fn take_contents(&mut self) -> Contents {
        std::mem::replace(&mut self.contents, Contents::Null)
    }

    pub fn set_contents(&mut self, contents: Contents) {
        self.contents = contents;
    }

    /// Materialize streamed contents into a buffer.
    ///
    /// Buffered and null records are returned unchanged.
    pub async fn into_buffered(mut self) -> BuildResult<Self> {
        if let Contents::Stream(mut stream) = self.take_contents() {
            let mut buf = BytesMut::new();
            while let Some(chunk) = stream.next().await {
                buf.extend_from_slice(&chunk?);
            }
            self.contents = Contents::Buffer(buf.freeze());
        }
        Ok(self)
    }
}

/// Normalize separators and strip leading `./` and `/`
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}
