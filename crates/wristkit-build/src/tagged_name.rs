//! `name~tag.ext` file names

use once_cell::sync::Lazy;
use regex::Regex;
use wristkit_core::{BuildError, BuildResult};

// The pattern matches every string; a failed match is a defect.
static TAGGED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([^~]*)(?:~([^.~]*))?(.*)$")
        .unwrap_or_else(|e| panic!("BUG: invalid tagged name pattern: {e}"))
});

/// A file name split around its optional `~tag` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedName {
    /// Text before the tag
    pub stem: String,
    pub tag: Option<String>,
    /// Text after the tag, usually the extension
    pub rest: String,
}

impl TaggedName {
    /// The name with its tag removed
    pub fn basename(&self) -> String {
        format!("{}{}", self.stem, self.rest)
    }

    /// The original name with the tag reinserted
    pub fn rejoin(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}~{tag}{}", self.stem, self.rest),
            None => self.basename(),
        }
    }
}

/// Split a file name into its untagged name and optional tag
pub fn split(name: &str) -> BuildResult<TaggedName> {
    let captures = TAGGED_NAME
        .captures(name)
        .ok_or_else(|| BuildError::internal(format!("tagged name pattern did not match {name:?}")))?;

    let group = |i| captures.get(i).map_or("", |m| m.as_str()).to_string();
    Ok(TaggedName {
        stem: group(1),
        tag: captures.get(2).map(|m| m.as_str().to_string()),
        rest: group(3),
    })
}
