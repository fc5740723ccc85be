//! Post-compile minification
//!
//! [`JsMinifier`] parses compiled output with oxc and prints it back out.
//! With `one_statement_per_line` the printer keeps every statement on its
//! own line, otherwise the output is packed. When the compiler produced a
//! source map, the printer's map is chained onto it so the result still
//! points at the original sources.

pub mod source_map;

use bytes::Bytes;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, Compressor};
use oxc_parser::Parser;
use oxc_span::SourceType;
use source_map::RawSourceMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use wristkit_core::{BuildError, BuildResult, Contents, SourceMap};
use wristkit_stream::{RecordStream, map_records};

const PLUGIN: &str = "minify";

/// Minifier settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifyOptions {
    /// Keep one statement per line so on-device stack traces stay usable
    pub one_statement_per_line: bool,
    /// Compression breaks source map fidelity and stays off
    pub compress: bool,
    pub source_map: bool,
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            one_statement_per_line: true,
            compress: false,
            source_map: true,
        }
    }
}

/// Minified code and its updated source map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifiedCode {
    pub code: Bytes,
    pub source_map: Option<Bytes>,
}

/// Post-compile code minifier
pub trait Minifier: Send + Sync + fmt::Debug {
    fn minify(
        &self,
        path: &str,
        code: Bytes,
        source_map: Option<Bytes>,
        options: &MinifyOptions,
    ) -> BuildResult<MinifiedCode>;
}

/// JavaScript minifier backed by oxc
#[derive(Debug, Clone, Copy, Default)]
pub struct JsMinifier;

impl Minifier for JsMinifier {
    fn minify(
        &self,
        path: &str,
        code: Bytes,
        input_map: Option<Bytes>,
        options: &MinifyOptions,
    ) -> BuildResult<MinifiedCode> {
        let text = std::str::from_utf8(&code)
            .map_err(|e| BuildError::fatal_at(PLUGIN, path, format!("not valid UTF-8: {e}")))?;

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, text, SourceType::mjs()).parse();
        if let Some(error) = parsed.errors.first() {
            return Err(BuildError::fatal_at(
                PLUGIN,
                path,
                format!("cannot parse compiled output: {error}"),
            ));
        }
        let mut program = parsed.program;
        if options.compress {
            Compressor::new(&allocator, CompressOptions::default()).build(&mut program);
        }

        let printed = Codegen::new()
            .with_options(CodegenOptions {
                minify: !options.one_statement_per_line,
                source_map_path: options.source_map.then(|| PathBuf::from(path)),
                ..CodegenOptions::default()
            })
            .build(&program);

        let source_map = match (printed.map, input_map) {
            (Some(printed_map), Some(input_map)) => {
                let outer: RawSourceMap = serde_json::from_str(&printed_map.to_json_string())?;
                let inner: RawSourceMap = serde_json::from_slice(&input_map).map_err(|e| {
                    BuildError::fatal_at(PLUGIN, path, format!("invalid source map: {e}"))
                })?;
                Some(Bytes::from(serde_json::to_vec(&source_map::compose(&outer, &inner)?)?))
            }
            (Some(printed_map), None) => Some(Bytes::from(printed_map.to_json_string())),
            (None, _) => None,
        };

        tracing::debug!(
            %path,
            before = code.len(),
            after = printed.code.len(),
            "code minified"
        );
        Ok(MinifiedCode {
            code: Bytes::from(printed.code),
            source_map,
        })
    }
}

/// Minify every buffered `.js` record; everything else passes through
pub fn minify(
    input: RecordStream,
    minifier: Arc<dyn Minifier>,
    options: MinifyOptions,
) -> RecordStream {
    map_records(input, move |mut record| {
        let Some(code) = record.bytes().cloned() else {
            return Ok(record);
        };
        if record.extension().as_deref() != Some("js") {
            return Ok(record);
        }

        let map = record.metadata.source_map.take().map(|m| m.contents);
        let minified = minifier.minify(record.path(), code, map, &options)?;
        record.set_contents(Contents::Buffer(minified.code));
        record.metadata.source_map = minified
            .source_map
            .map(|contents| SourceMap { contents });
        Ok(record)
    })
}
