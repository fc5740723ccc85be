#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;

const APP_ID: &str = "b4ae822e-eca9-4fcb-8747-217f2a1f53a1";

/// Build a minimal little-endian ELF object holding `sections`
pub(crate) fn elf(is_64: bool, sections: &[(&str, &[u8])]) -> Vec<u8> {
    let header_len = if is_64 { 64 } else { 52 };
    let entry_len = if is_64 { 64 } else { 40 };

    let mut names = vec![0u8];
    let mut body = Vec::new();
    let mut entries = Vec::new();
    for (name, contents) in sections.iter().chain([(".shstrtab", &[][..])].iter()) {
        let name_offset = names.len();
        names.extend_from_slice(name.as_bytes());
        names.push(0);
        entries.push((name_offset, header_len + body.len(), contents.to_vec()));
        body.extend_from_slice(contents);
    }
    // the name table is the last section; fill in its contents now
    let last = entries.len() - 1;
    entries[last].1 = header_len + body.len();
    entries[last].2 = names.clone();
    body.extend_from_slice(&names);

    let shoff = header_len + body.len();
    let shnum = entries.len() + 1;
    let mut out = vec![0u8; header_len];
    out[..4].copy_from_slice(b"\x7fELF");
    out[4] = if is_64 { 2 } else { 1 };
    out[5] = 1;
    out[6] = 1;
    if is_64 {
        out[0x28..0x30].copy_from_slice(&(shoff as u64).to_le_bytes());
        out[0x3A..0x3C].copy_from_slice(&(entry_len as u16).to_le_bytes());
        out[0x3C..0x3E].copy_from_slice(&(shnum as u16).to_le_bytes());
        out[0x3E..0x40].copy_from_slice(&((shnum - 1) as u16).to_le_bytes());
    } else {
        out[0x20..0x24].copy_from_slice(&(shoff as u32).to_le_bytes());
        out[0x2E..0x30].copy_from_slice(&(entry_len as u16).to_le_bytes());
        out[0x30..0x32].copy_from_slice(&(shnum as u16).to_le_bytes());
        out[0x32..0x34].copy_from_slice(&((shnum - 1) as u16).to_le_bytes());
    }
    out.extend_from_slice(&body);

    // null section header first
    out.extend(std::iter::repeat_n(0u8, entry_len));
    for (name, offset, contents) in entries {
        let mut entry = vec![0u8; entry_len];
        entry[0..4].copy_from_slice(&(name as u32).to_le_bytes());
        entry[4..8].copy_from_slice(&1u32.to_le_bytes());
        if is_64 {
            entry[0x18..0x20].copy_from_slice(&(offset as u64).to_le_bytes());
            entry[0x20..0x28].copy_from_slice(&(contents.len() as u64).to_le_bytes());
        } else {
            entry[0x10..0x14].copy_from_slice(&(offset as u32).to_le_bytes());
            entry[0x14..0x18].copy_from_slice(&(contents.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(&entry);
    }
    out
}

pub(crate) fn component(is_64: bool, build_id: u64, app_id: &str, family: &str) -> Vec<u8> {
    let build_id = build_id.to_le_bytes();
    let app_id = format!("{app_id}\0");
    let family = format!("{family}\0");
    elf(
        is_64,
        &[
            (".text", b"\x00\x01\x02\x03".as_slice()),
            (SECTION_BUILD_ID, build_id.as_slice()),
            (SECTION_APP_ID, app_id.as_bytes()),
            (SECTION_FAMILY, family.as_bytes()),
            (SECTION_PLATFORM, b">=32.1.0.0\0>=33.0.0.0\0".as_slice()),
        ],
    )
}

#[test]
fn read_native_info___elf32___all_sections() {
    let data = component(false, 0x1122_3344_5566_7788, APP_ID, "atlas");

    let info = read_native_info("atlas.bin", &data).unwrap();

    assert_eq!(info.build_id, BuildId::new(0x1122_3344_5566_7788));
    assert_eq!(info.app_id, APP_ID);
    assert_eq!(info.family, "atlas");
    assert_eq!(info.platform, [">=32.1.0.0", ">=33.0.0.0"]);
}

#[test]
fn read_native_info___elf64___all_sections() {
    let data = component(true, 42, APP_ID, "vulcan");

    let info = read_native_info("vulcan.bin", &data).unwrap();

    assert_eq!(info.build_id.value(), 42);
    assert_eq!(info.family, "vulcan");
}

#[test]
fn read_native_info___missing_section___fatal_names_file_and_section() {
    let data = elf(false, &[(SECTION_BUILD_ID, 7u64.to_le_bytes().as_slice())]);

    let err = read_native_info("broken.bin", &data).unwrap_err();

    assert_eq!(err.path(), Some("broken.bin"));
    assert!(err.to_string().contains(SECTION_APP_ID));
}

#[test]
fn read_native_info___not_elf___fatal() {
    let err = read_native_info("app.js", b"console.log(1)").unwrap_err();

    assert!(err.is_project_error());
}

#[test]
fn read_native_info___truncated___fatal() {
    let mut data = component(true, 1, APP_ID, "atlas");
    data.truncate(data.len() - 10);

    assert!(read_native_info("cut.bin", &data).is_err());
}

fn write(dir: &TempDir, name: &str, data: &[u8]) -> String {
    fs::write(dir.path().join(name), data).unwrap();
    name.to_string()
}

#[tokio::test]
async fn load_native_components___consistent___tagged_records() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "atlas.bin", &component(false, 9, &APP_ID.to_uppercase(), "atlas")),
        write(&dir, "vulcan.bin", &component(true, 9, APP_ID, "vulcan")),
    ];

    let native = load_native_components(dir.path(), &paths, Uuid::parse_str(APP_ID).unwrap())
        .await
        .unwrap();

    assert_eq!(native.build_id.value(), 9);
    let names: Vec<&str> = native.records.iter().map(FileRecord::path).collect();
    assert_eq!(names, ["device-atlas.bundle", "device-vulcan.bundle"]);
    let tag = native.records[0].metadata.bundle.as_ref().unwrap();
    assert!(tag.kind.is_native());
    assert_eq!(tag.kind.slot(), ("device", Some("atlas")));
}

#[tokio::test]
async fn load_native_components___app_id_mismatch___lists_every_file() {
    let dir = TempDir::new().unwrap();
    let other = "00000000-0000-0000-0000-000000000001";
    let paths = vec![
        write(&dir, "a.bin", &component(false, 1, other, "atlas")),
        write(&dir, "b.bin", &component(false, 1, APP_ID, "vulcan")),
        write(&dir, "c.bin", &component(false, 1, other, "hera")),
    ];

    let err = load_native_components(dir.path(), &paths, Uuid::parse_str(APP_ID).unwrap())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("a.bin"));
    assert!(message.contains("c.bin"));
    assert!(!message.contains("b.bin"));
}

#[tokio::test]
async fn load_native_components___build_id_mismatch___fatal() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "a.bin", &component(false, 1, APP_ID, "atlas")),
        write(&dir, "b.bin", &component(false, 2, APP_ID, "vulcan")),
    ];

    let err = load_native_components(dir.path(), &paths, Uuid::parse_str(APP_ID).unwrap())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("different build ids"));
}

#[tokio::test]
async fn load_native_components___missing_file___fatal_with_path() {
    let dir = TempDir::new().unwrap();

    let err = load_native_components(
        dir.path(),
        &["missing.bin".to_string()],
        Uuid::parse_str(APP_ID).unwrap(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.path(), Some("missing.bin"));
}
