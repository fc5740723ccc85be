//! Prebuilt native device components
//!
//! Native components are ELF objects carrying their identity in four
//! sections. Every component of one app must agree on the app id and the
//! build id.

use std::path::Path;
use uuid::Uuid;
use wristkit_core::{BuildError, BuildId, BuildResult, BundleKind, BundleTag, FileRecord, Metadata};

const PLUGIN: &str = "native";

pub const SECTION_BUILD_ID: &str = ".appbuildid";
pub const SECTION_APP_ID: &str = ".appuuid";
pub const SECTION_FAMILY: &str = ".appfamily";
pub const SECTION_PLATFORM: &str = ".appplatform";

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";
const ELF_CLASS_32: u8 = 1;
const ELF_CLASS_64: u8 = 2;
const ELF_DATA_LE: u8 = 1;
const SHT_NOBITS: u32 = 8;

/// Identity read from one native component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeComponentInfo {
    pub build_id: BuildId,
    pub app_id: String,
    pub family: String,
    pub platform: Vec<String>,
}

/// Every native component of a project, validated together
#[derive(Debug)]
pub struct NativeComponents {
    /// The build id shared by all components
    pub build_id: BuildId,
    /// `device-<family>.bundle` records tagged as native device bundles
    pub records: Vec<FileRecord>,
}

/// Read the identity sections of an ELF object
pub fn read_native_info(path: &str, data: &[u8]) -> BuildResult<NativeComponentInfo> {
    let sections = elf_sections(data).map_err(|e| BuildError::fatal_at(PLUGIN, path, e))?;
    let section = |name: &str| {
        sections
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, contents)| *contents)
            .ok_or_else(|| {
                BuildError::fatal_at(PLUGIN, path, format!("missing required section {name}"))
            })
    };

    let build_id = section(SECTION_BUILD_ID)?;
    let build_id: [u8; 8] = build_id.try_into().map_err(|_| {
        BuildError::fatal_at(
            PLUGIN,
            path,
            format!("{SECTION_BUILD_ID} must be 8 bytes, found {}", build_id.len()),
        )
    })?;

    let text = |name: &str| -> BuildResult<Vec<String>> {
        let contents = section(name)?;
        let strings: Vec<String> = contents
            .split(|b| *b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();
        if strings.is_empty() {
            return Err(BuildError::fatal_at(PLUGIN, path, format!("section {name} is empty")));
        }
        Ok(strings)
    };

    let app_id = text(SECTION_APP_ID)?.remove(0);
    let family = text(SECTION_FAMILY)?.remove(0);
    let platform = text(SECTION_PLATFORM)?;

    Ok(NativeComponentInfo {
        build_id: BuildId::new(u64::from_le_bytes(build_id)),
        app_id,
        family,
        platform,
    })
}

/// Read and cross-check the native components listed in the project
pub async fn load_native_components(
    root: &Path,
    paths: &[String],
    app_uuid: Uuid,
) -> BuildResult<NativeComponents> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(root.join(path)).await.map_err(|e| {
            BuildError::fatal_at(PLUGIN, path.as_str(), format!("cannot read native component: {e}"))
        })?;
        let info = read_native_info(path, &data)?;
        tracing::debug!(%path, family = %info.family, build_id = %info.build_id, "native component read");
        loaded.push((path.as_str(), info, data));
    }

    let expected = app_uuid.to_string();
    let mismatched: Vec<String> = loaded
        .iter()
        .filter(|(_, info, _)| !info.app_id.eq_ignore_ascii_case(&expected))
        .map(|(path, info, _)| format!("{path} ({})", info.app_id))
        .collect();
    if !mismatched.is_empty() {
        return Err(BuildError::fatal(
            PLUGIN,
            format!(
                "Native components were built for a different app than {expected}: {}",
                mismatched.join(", ")
            ),
        ));
    }

    let Some((_, first, _)) = loaded.first() else {
        return Err(BuildError::internal("no native components to load"));
    };
    let build_id = first.build_id;
    if loaded.iter().any(|(_, info, _)| info.build_id != build_id) {
        let ids: Vec<String> = loaded
            .iter()
            .map(|(path, info, _)| format!("{path} ({})", info.build_id))
            .collect();
        return Err(BuildError::fatal(
            PLUGIN,
            format!("Native components have different build ids: {}", ids.join(", ")),
        ));
    }

    let records = loaded
        .into_iter()
        .map(|(_, info, data)| {
            let kind = BundleKind::Device {
                family: info.family.clone(),
                platform: info.platform,
                native: true,
            };
            FileRecord::buffer(format!("device-{}.bundle", info.family), data).with_metadata(Metadata {
                bundle: Some(BundleTag::new(kind)),
                ..Metadata::default()
            })
        })
        .collect();

    Ok(NativeComponents { build_id, records })
}

struct Elf<'a> {
    data: &'a [u8],
    is_64: bool,
}

impl<'a> Elf<'a> {
    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N], String> {
        offset
            .checked_add(N)
            .and_then(|end| self.data.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| format!("truncated ELF file at offset {offset:#x}"))
    }

    fn u16(&self, offset: usize) -> Result<usize, String> {
        Ok(usize::from(u16::from_le_bytes(self.bytes(offset)?)))
    }

    fn u32(&self, offset: usize) -> Result<u32, String> {
        Ok(u32::from_le_bytes(self.bytes(offset)?))
    }

    /// A word-sized field: u32 in ELF32, u64 in ELF64
    fn word(&self, offset: usize) -> Result<usize, String> {
        let value = if self.is_64 {
            u64::from_le_bytes(self.bytes(offset)?)
        } else {
            u64::from(self.u32(offset)?)
        };
        usize::try_from(value).map_err(|_| format!("ELF offset {value:#x} out of range"))
    }

    fn slice(&self, offset: usize, size: usize) -> Result<&'a [u8], String> {
        offset
            .checked_add(size)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| format!("ELF section at {offset:#x} runs past end of file"))
    }
}

/// Named sections of a little-endian ELF32/ELF64 object
fn elf_sections(data: &[u8]) -> Result<Vec<(String, &[u8])>, String> {
    if data.get(..4) != Some(ELF_MAGIC.as_slice()) {
        return Err("not an ELF file".to_string());
    }
    let is_64 = match data.get(4) {
        Some(&ELF_CLASS_32) => false,
        Some(&ELF_CLASS_64) => true,
        _ => return Err("unsupported ELF class".to_string()),
    };
    if data.get(5) != Some(&ELF_DATA_LE) {
        return Err("only little-endian ELF files are supported".to_string());
    }

    let elf = Elf { data, is_64 };
    let (shoff, shentsize, shnum, shstrndx) = if is_64 {
        (elf.word(0x28)?, elf.u16(0x3A)?, elf.u16(0x3C)?, elf.u16(0x3E)?)
    } else {
        (elf.word(0x20)?, elf.u16(0x2E)?, elf.u16(0x30)?, elf.u16(0x32)?)
    };
    let (offset_field, size_field) = if is_64 { (0x18, 0x20) } else { (0x10, 0x14) };

    let mut headers = Vec::with_capacity(shnum);
    for index in 0..shnum {
        let base = shoff + index * shentsize;
        let name = elf.u32(base)? as usize;
        let kind = elf.u32(base + 4)?;
        let offset = elf.word(base + offset_field)?;
        let size = elf.word(base + size_field)?;
        let contents = if kind == SHT_NOBITS { &[][..] } else { elf.slice(offset, size)? };
        headers.push((name, contents));
    }

    let names = headers
        .get(shstrndx)
        .map(|(_, contents)| *contents)
        .ok_or_else(|| "missing section name table".to_string())?;
    headers
        .into_iter()
        .map(|(name, contents)| {
            let tail = names
                .get(name..)
                .ok_or_else(|| format!("section name offset {name} out of range"))?;
            let end = tail.iter().position(|b| *b == 0).unwrap_or(tail.len());
            Ok((String::from_utf8_lossy(&tail[..end]).into_owned(), contents))
        })
        .collect()
}

#[cfg(test)]
#[path = "native/native_tests.rs"]
pub(crate) mod native_tests;
