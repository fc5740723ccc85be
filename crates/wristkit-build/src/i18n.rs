//! Translation compiler
//!
//! Collects `.po` files named after their language (`fr-FR.po`), checks
//! each language is supported and claimed by one file only, and emits one
//! compiled `l/<tag>` table per language once the input ends.

pub mod language;
pub mod po;
pub mod table;

use std::collections::{BTreeMap, BTreeSet};
use wristkit_core::{BuildError, BuildResult, ComponentType, FileRecord, Metadata};
use wristkit_stream::{Accumulator, RecordStream, accumulate};

const PLUGIN: &str = "translations";

/// Directory compiled tables are written to
pub const OUTPUT_DIR: &str = "l";

#[derive(Debug)]
struct Translation {
    source: String,
    table: BTreeMap<String, String>,
}

/// Buffered-flush stage compiling `.po` files; other records pass through
#[derive(Debug)]
pub struct TranslationCompiler {
    default_language: String,
    supported: BTreeSet<String>,
    languages: BTreeMap<String, Translation>,
}

impl TranslationCompiler {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: language::normalize(default_language)
                .unwrap_or_else(|| default_language.to_string()),
            supported: language::SUPPORTED_LANGUAGES
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            languages: BTreeMap::new(),
        }
    }

    /// Replace the supported locale set
    pub fn with_supported<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.supported = tags
            .into_iter()
            .filter_map(|tag| language::normalize(tag.as_ref()))
            .collect();
        self
    }

    fn compile(path: &str, data: &[u8]) -> BuildResult<BTreeMap<String, String>> {
        let text = std::str::from_utf8(data)
            .map_err(|e| BuildError::fatal_at(PLUGIN, path, format!("not valid UTF-8: {e}")))?;
        let entries = po::parse(text)
            .map_err(|e| BuildError::fatal_at(PLUGIN, path, format!("cannot parse translations: {e}")))?;

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.is_header())
            .filter_map(|entry| {
                let translation = entry.translation().filter(|t| !t.is_empty())?.to_string();
                Some((entry.key(), translation))
            })
            .collect())
    }
}

impl Accumulator for TranslationCompiler {
    fn name(&self) -> &'static str {
        PLUGIN
    }

    fn observe(&mut self, record: FileRecord) -> BuildResult<Option<FileRecord>> {
        if record.extension().as_deref() != Some("po") {
            return Ok(Some(record));
        }

        let path = record.path();
        let tag = language::normalize(record.stem()).ok_or_else(|| {
            BuildError::fatal_at(
                PLUGIN,
                path,
                format!("File name is not a language tag: {}", record.stem()),
            )
        })?;
        if !self.supported.contains(&tag) {
            return Err(BuildError::fatal_at(
                PLUGIN,
                path,
                format!("Language {tag} is not supported"),
            ));
        }
        if let Some(existing) = self.languages.get(&tag) {
            return Err(BuildError::fatal_at(
                PLUGIN,
                path,
                format!("Duplicate translation for {tag}, already provided by {}", existing.source),
            ));
        }

        let data = record.bytes().ok_or_else(|| {
            BuildError::fatal_at(PLUGIN, path, "translation sources must be buffered")
        })?;
        let table = Self::compile(path, data)?;
        tracing::debug!(%path, %tag, messages = table.len(), "translation loaded");
        self.languages.insert(
            tag,
            Translation {
                source: path.to_string(),
                table,
            },
        );
        Ok(None)
    }

    fn finish(self) -> BuildResult<Vec<FileRecord>> {
        if self.languages.is_empty() {
            return Ok(Vec::new());
        }
        if !self.languages.contains_key(&self.default_language) {
            return Err(BuildError::fatal(
                PLUGIN,
                format!(
                    "No translation found for the default language {}",
                    self.default_language
                ),
            ));
        }

        self.languages
            .into_iter()
            .map(|(tag, translation)| {
                let compiled = table::encode(&translation.table)?;
                let record = FileRecord::buffer(format!("{OUTPUT_DIR}/{tag}"), compiled);
                Ok(record.with_metadata(Metadata {
                    component: Some(ComponentType::Device),
                    translation_language: Some(tag),
                    ..Metadata::default()
                }))
            })
            .collect()
    }
}

/// Compile `.po` records into per-language tables
pub fn compile_translations(input: RecordStream, default_language: &str) -> RecordStream {
    accumulate(input, TranslationCompiler::new(default_language))
}
