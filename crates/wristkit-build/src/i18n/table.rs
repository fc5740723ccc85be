//! Compiled message tables (`LTB1`)
//!
//! ```text
//! magic "LTB1" | u32le count | count x (u16le key len, key, u16le value len, value)
//! ```
//!
//! Entries are sorted by key so the device can binary-search them.

use std::collections::BTreeMap;
use wristkit_core::{BuildError, BuildResult};

pub const MAGIC: &[u8; 4] = b"LTB1";

/// Encode a key/value table
pub fn encode(entries: &BTreeMap<String, String>) -> BuildResult<Vec<u8>> {
    let count = u32::try_from(entries.len())
        .map_err(|_| BuildError::internal("message table has too many entries"))?;
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&count.to_le_bytes());
    for (key, value) in entries {
        write_string(&mut out, key)?;
        write_string(&mut out, value)?;
    }
    Ok(out)
}

fn write_string(out: &mut Vec<u8>, text: &str) -> BuildResult<()> {
    let len = u16::try_from(text.len()).map_err(|_| {
        BuildError::fatal(
            "translations",
            format!("message longer than {} bytes: {:.40}...", u16::MAX, text),
        )
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

/// Decode a table written by [`encode`]
pub fn decode(data: &[u8]) -> BuildResult<BTreeMap<String, String>> {
    let malformed = |what: &str| BuildError::internal(format!("malformed message table: {what}"));
    if data.get(..4) != Some(MAGIC.as_slice()) {
        return Err(malformed("bad magic"));
    }
    let count = data
        .get(4..8)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| malformed("missing count"))?;

    let mut pos = 8;
    let read_string = |pos: &mut usize| -> BuildResult<String> {
        let len = data
            .get(*pos..*pos + 2)
            .map(|b| usize::from(u16::from_le_bytes([b[0], b[1]])))
            .ok_or_else(|| malformed("truncated length"))?;
        let bytes = data
            .get(*pos + 2..*pos + 2 + len)
            .ok_or_else(|| malformed("truncated string"))?;
        *pos += 2 + len;
        String::from_utf8(bytes.to_vec()).map_err(|_| malformed("invalid UTF-8"))
    };

    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let key = read_string(&mut pos)?;
        let value = read_string(&mut pos)?;
        entries.insert(key, value);
    }
    if pos != data.len() {
        return Err(malformed("trailing bytes"));
    }
    Ok(entries)
}
