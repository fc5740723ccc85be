//! Gettext `.po` parser
//!
//! Supports `msgctxt`, `msgid`, `msgid_plural`, `msgstr` and `msgstr[n]`
//! keywords, multi-line string continuations and the C escapes gettext
//! writes. Comments, including obsolete `#~` entries, are skipped.

use thiserror::Error;

/// A malformed `.po` file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct PoError {
    pub line: usize,
    pub message: String,
}

impl PoError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    pub context: Option<String>,
    pub id: String,
    pub plural: Option<String>,
    /// `msgstr`, or `msgstr[0..n]` for plural entries
    pub strings: Vec<String>,
}

impl PoEntry {
    /// Lookup key; gettext joins context and id with EOT
    pub fn key(&self) -> String {
        match &self.context {
            Some(context) => format!("{context}\u{4}{}", self.id),
            None => self.id.clone(),
        }
    }

    /// The singular translation
    pub fn translation(&self) -> Option<&str> {
        self.strings.first().map(String::as_str)
    }

    /// Catalog header (`msgid ""`)
    pub fn is_header(&self) -> bool {
        self.id.is_empty() && self.context.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    Plural,
    Str(usize),
}

#[derive(Default)]
struct Builder {
    entry: PoEntry,
    has_id: bool,
    has_str: bool,
}

/// Parse `.po` text into entries, in file order
pub fn parse(text: &str) -> Result<Vec<PoEntry>, PoError> {
    let mut entries = Vec::new();
    let mut current = Builder::default();
    let mut field: Option<Field> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('"') {
            let Some(active) = field else {
                return Err(PoError::new(line_no, "string without a keyword"));
            };
            let value = unquote(line, line_no)?;
            field_mut(&mut current.entry, active).push_str(&value);
            continue;
        }

        let (keyword, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| PoError::new(line_no, format!("expected a keyword and a string: {line}")))?;
        let value = unquote(rest.trim(), line_no)?;

        let next = match keyword {
            "msgctxt" => Field::Context,
            "msgid" => Field::Id,
            "msgid_plural" => Field::Plural,
            "msgstr" => Field::Str(0),
            other => match other
                .strip_prefix("msgstr[")
                .and_then(|s| s.strip_suffix(']'))
                .and_then(|n| n.parse::<usize>().ok())
            {
                Some(n) => Field::Str(n),
                None => return Err(PoError::new(line_no, format!("unknown keyword {other}"))),
            },
        };

        // A new msgctxt/msgid after a complete entry starts the next one.
        if matches!(next, Field::Context | Field::Id) && current.has_str {
            entries.push(std::mem::take(&mut current).entry);
        }

        match next {
            Field::Context => {
                if current.has_id {
                    return Err(PoError::new(line_no, "msgctxt must come before msgid"));
                }
                current.entry.context = Some(String::new());
            }
            Field::Id => {
                if current.has_id {
                    return Err(PoError::new(line_no, "msgid without msgstr"));
                }
                current.has_id = true;
            }
            Field::Plural => {
                if !current.has_id || current.has_str {
                    return Err(PoError::new(line_no, "msgid_plural must follow msgid"));
                }
                current.entry.plural = Some(String::new());
            }
            Field::Str(n) => {
                if !current.has_id {
                    return Err(PoError::new(line_no, "msgstr without msgid"));
                }
                if n != current.entry.strings.len() {
                    return Err(PoError::new(line_no, format!("msgstr[{n}] out of order")));
                }
                current.entry.strings.push(String::new());
                current.has_str = true;
            }
        }
        field_mut(&mut current.entry, next).push_str(&value);
        field = Some(next);
    }

    if current.has_str {
        entries.push(current.entry);
    } else if current.has_id {
        return Err(PoError::new(text.lines().count(), "msgid without msgstr at end of file"));
    }
    Ok(entries)
}

fn field_mut(entry: &mut PoEntry, field: Field) -> &mut String {
    match field {
        Field::Context => entry.context.get_or_insert_with(String::new),
        Field::Id => &mut entry.id,
        Field::Plural => entry.plural.get_or_insert_with(String::new),
        Field::Str(n) => {
            if entry.strings.len() <= n {
                entry.strings.resize(n + 1, String::new());
            }
            &mut entry.strings[n]
        }
    }
}

fn unquote(text: &str, line: usize) -> Result<String, PoError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| PoError::new(line, "unterminated string"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            return Err(PoError::new(line, "unescaped quote inside string"));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(PoError::new(line, format!("unknown escape \\{other}")));
            }
            None => return Err(PoError::new(line, "unterminated string")),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "po/po_tests.rs"]
mod po_tests;
