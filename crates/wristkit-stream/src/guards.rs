//! Cross-cutting validation stages composed around every build stage

use crate::{Accumulator, RecordStream, accumulate};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use wristkit_core::{
    BuildError, BuildResult, ComponentType, Contents, Diagnostic, Diagnostics, FileRecord,
};

/// Buffers every record and fails at flush if any path was seen twice
#[derive(Debug, Default)]
pub struct DuplicateDetector {
    records: Vec<FileRecord>,
    counts: HashMap<String, usize>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Accumulator for DuplicateDetector {
    fn name(&self) -> &'static str {
        "duplicates"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        *self.counts.entry(record.path().to_string()).or_default() += 1;
        self.records.push(record);
        Ok(None)
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        let duplicates: BTreeSet<&str> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(path, _)| path.as_str())
            .collect();

        if !duplicates.is_empty() {
            let list: Vec<&str> = duplicates.into_iter().collect();
            return Err(BuildError::fatal(
                self.name(),
                format!("Duplicate output paths: {}", list.join(", ")),
            ));
        }
        Ok(self.records)
    }
}

/// Fail if any path appears more than once
pub fn detect_duplicates(input: RecordStream) -> RecordStream {
    accumulate(input, DuplicateDetector::new())
}

/// Pass-through stage asserting that every expected path is seen
#[derive(Debug)]
pub struct RequiredFiles {
    missing: BTreeSet<String>,
}

impl RequiredFiles {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            missing: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Accumulator for RequiredFiles {
    fn name(&self) -> &'static str {
        "required-files"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        self.missing.remove(record.path());
        Ok(Some(record))
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        if self.missing.is_empty() {
            return Ok(Vec::new());
        }
        let list: Vec<&str> = self.missing.iter().map(String::as_str).collect();
        Err(BuildError::fatal(
            self.name(),
            format!("Required files were not found: {}", list.join(", ")),
        ))
    }
}

/// Fail at end of input if any of `paths` never appeared
pub fn require_files<I, S>(input: RecordStream, paths: I) -> RecordStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    accumulate(input, RequiredFiles::new(paths))
}

/// Pass-through stage warning about files above a per-path byte ceiling
#[derive(Debug)]
pub struct SizeLimit {
    limits: BTreeMap<String, u64>,
    diagnostics: Diagnostics,
    target: Option<ComponentType>,
}

impl SizeLimit {
    pub fn new(limits: BTreeMap<String, u64>, diagnostics: Diagnostics) -> Self {
        Self {
            limits,
            diagnostics,
            target: None,
        }
    }

    pub fn with_target(mut self, target: ComponentType) -> Self {
        self.target = Some(target);
        self
    }
}

impl Accumulator for SizeLimit {
    fn name(&self) -> &'static str {
        "size-limit"
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        let Some(&limit) = self.limits.get(record.path()) else {
            return Ok(Some(record));
        };

        let actual = match record.contents() {
            Contents::Buffer(bytes) => bytes.len() as u64,
            Contents::Null => return Ok(Some(record)),
            Contents::Stream(_) => {
                return Err(BuildError::fatal_at(
                    self.name(),
                    record.path(),
                    "Streamed contents cannot be size checked; buffer the file first",
                ));
            }
        };

        if actual > limit {
            let mut diagnostic = Diagnostic::warning(format!(
                "{} is {} ({actual} bytes), exceeding the allowed {} ({limit} bytes)",
                record.path(),
                format_size(actual),
                format_size(limit),
            ));
            if let Some(target) = self.target {
                diagnostic = diagnostic.with_target(target);
            }
            self.diagnostics.push(diagnostic);
        }
        Ok(Some(record))
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        Ok(Vec::new())
    }
}

/// Warn about files larger than their configured limit
pub fn validate_sizes(
    input: RecordStream,
    limits: BTreeMap<String, u64>,
    diagnostics: Diagnostics,
) -> RecordStream {
    accumulate(input, SizeLimit::new(limits, diagnostics))
}

/// Human-readable byte count, e.g. `1.50 KiB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
