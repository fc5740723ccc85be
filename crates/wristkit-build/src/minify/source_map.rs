//! Source map v3 decoding, encoding and composition
//!
//! Only the parts the minifier needs: `mappings` is decoded into absolute
//! segments, and a map over minified code is chained onto the compiler's
//! map so the result points straight at the original sources.

use serde::{Deserialize, Serialize};
use wristkit_core::{BuildError, BuildResult};

/// A source map document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    #[serde(default = "version_3")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

fn version_3() -> u32 {
    3
}

/// Original position a generated column maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub source: u32,
    pub line: u32,
    pub column: u32,
    pub name: Option<u32>,
}

/// One decoded mapping segment with absolute values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub column: u32,
    pub origin: Option<Origin>,
}

/// Decoded `mappings`, one entry per generated line
pub type Mappings = Vec<Vec<Segment>>;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn base64_value(byte: u8) -> Option<i64> {
    BASE64.iter().position(|&b| b == byte).map(|i| i as i64)
}

fn decode_vlq(field: &[u8], out: &mut Vec<i64>) -> BuildResult<()> {
    let invalid = || BuildError::fatal("minify", "invalid source map mappings");
    let mut value = 0i64;
    let mut shift = 0u32;
    for &byte in field {
        let digit = base64_value(byte).ok_or_else(invalid)?;
        if shift > 60 {
            return Err(invalid());
        }
        value |= (digit & 0x1F) << shift;
        if digit & 0x20 != 0 {
            shift += 5;
            continue;
        }
        let magnitude = value >> 1;
        out.push(if value & 1 == 1 { -magnitude } else { magnitude });
        value = 0;
        shift = 0;
    }
    if shift != 0 {
        return Err(invalid());
    }
    Ok(())
}

fn encode_vlq(value: i64, out: &mut String) {
    let mut rest = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = rest & 0x1F;
        rest >>= 5;
        if rest > 0 {
            digit |= 0x20;
        }
        out.push(BASE64[digit as usize] as char);
        if rest == 0 {
            break;
        }
    }
}

fn absolute(previous: i64, delta: i64) -> BuildResult<u32> {
    u32::try_from(previous + delta)
        .map_err(|_| BuildError::fatal("minify", "source map position out of range"))
}

/// Decode a `mappings` string
pub fn decode(mappings: &str) -> BuildResult<Mappings> {
    let mut lines = Vec::new();
    let (mut source, mut line, mut column, mut name) = (0i64, 0i64, 0i64, 0i64);
    let mut fields = Vec::with_capacity(5);

    for text in mappings.split(';') {
        let mut segments = Vec::new();
        let mut generated = 0i64;
        for segment in text.split(',').filter(|s| !s.is_empty()) {
            fields.clear();
            decode_vlq(segment.as_bytes(), &mut fields)?;
            let column_value = absolute(generated, fields[0])?;
            generated = i64::from(column_value);

            let origin = match fields.len() {
                1 => None,
                4 | 5 => {
                    source = i64::from(absolute(source, fields[1])?);
                    line = i64::from(absolute(line, fields[2])?);
                    column = i64::from(absolute(column, fields[3])?);
                    let name_index = match fields.get(4) {
                        Some(&delta) => {
                            name = i64::from(absolute(name, delta)?);
                            Some(name as u32)
                        }
                        None => None,
                    };
                    Some(Origin {
                        source: source as u32,
                        line: line as u32,
                        column: column as u32,
                        name: name_index,
                    })
                }
                _ => {
                    return Err(BuildError::fatal(
                        "minify",
                        "invalid source map segment length",
                    ));
                }
            };
            segments.push(Segment {
                column: column_value,
                origin,
            });
        }
        lines.push(segments);
    }
    Ok(lines)
}

/// Encode decoded mappings back into a `mappings` string
pub fn encode(lines: &Mappings) -> String {
    let mut out = String::new();
    let (mut source, mut line, mut column, mut name) = (0i64, 0i64, 0i64, 0i64);

    for (index, segments) in lines.iter().enumerate() {
        if index > 0 {
            out.push(';');
        }
        let mut generated = 0i64;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            encode_vlq(i64::from(segment.column) - generated, &mut out);
            generated = i64::from(segment.column);

            if let Some(origin) = segment.origin {
                encode_vlq(i64::from(origin.source) - source, &mut out);
                encode_vlq(i64::from(origin.line) - line, &mut out);
                encode_vlq(i64::from(origin.column) - column, &mut out);
                source = i64::from(origin.source);
                line = i64::from(origin.line);
                column = i64::from(origin.column);
                if let Some(index) = origin.name {
                    encode_vlq(i64::from(index) - name, &mut out);
                    name = i64::from(index);
                }
            }
        }
    }
    out
}

/// Last origin on `line` at or before `column`
fn lookup(lines: &Mappings, line: u32, column: u32) -> Option<Origin> {
    let segments = lines.get(line as usize)?;
    let end = segments.partition_point(|s| s.column <= column);
    segments[..end].last().and_then(|s| s.origin)
}

/// Chain `outer` (generated -> intermediate) onto `inner`
/// (intermediate -> original).
///
/// The result keeps `inner`'s sources and names. Segments of `outer` that
/// land on unmapped intermediate code are dropped.
pub fn compose(outer: &RawSourceMap, inner: &RawSourceMap) -> BuildResult<RawSourceMap> {
    let outer_lines = decode(&outer.mappings)?;
    let inner_lines = decode(&inner.mappings)?;

    let composed: Mappings = outer_lines
        .iter()
        .map(|segments| {
            let mut out: Vec<Segment> = Vec::new();
            for segment in segments {
                let Some(origin) = segment
                    .origin
                    .and_then(|o| lookup(&inner_lines, o.line, o.column))
                else {
                    continue;
                };
                if out.last().is_some_and(|last| last.origin == Some(origin)) {
                    continue;
                }
                out.push(Segment {
                    column: segment.column,
                    origin: Some(origin),
                });
            }
            out
        })
        .collect();

    Ok(RawSourceMap {
        version: 3,
        file: outer.file.clone().or_else(|| inner.file.clone()),
        source_root: inner.source_root.clone(),
        sources: inner.sources.clone(),
        sources_content: inner.sources_content.clone(),
        names: inner.names.clone(),
        mappings: encode(&composed),
    })
}
