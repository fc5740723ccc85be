#![allow(non_snake_case)]

use super::*;
use futures::StreamExt;
use std::io::Read;
use wristkit_core::SourceMap;
use wristkit_stream::{collect, from_records};
use zip::ZipArchive;

fn read_zip(bytes: &Bytes) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap()
}

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
    let mut contents = Vec::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    contents
}

#[tokio::test]
async fn archive___writes_single_zip_record() {
    let lazy = futures::stream::iter(vec![Ok(Bytes::from_static(b"lazy"))]).boxed();
    let input = from_records([
        FileRecord::buffer("b.txt", Bytes::from_static(b"bee")),
        FileRecord::directory("dir"),
        FileRecord::stream("a.txt", lazy),
    ]);

    let records = collect(archive(input, "out.zip", None)).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path(), "out.zip");
    assert!(records[0].metadata.bundle.is_none());

    let mut zip = read_zip(records[0].bytes().unwrap());
    assert_eq!(zip.len(), 2);
    assert_eq!(zip.name_for_index(0), Some("a.txt"));
    assert_eq!(read_entry(&mut zip, "a.txt"), b"lazy");
    assert_eq!(read_entry(&mut zip, "b.txt"), b"bee");
}

#[tokio::test]
async fn archive___duplicate_paths___fatal() {
    let input = from_records([
        FileRecord::buffer("a.txt", Bytes::new()),
        FileRecord::buffer("a.txt", Bytes::new()),
    ]);

    let err = collect(archive(input, "out.zip", None)).await.unwrap_err();

    assert!(err.to_string().contains("a.txt"));
}

#[tokio::test]
async fn archive___identical_input___identical_bytes() {
    let make = || {
        from_records([
            FileRecord::buffer("y", Bytes::from_static(b"2")),
            FileRecord::buffer("x", Bytes::from_static(b"1")),
        ])
    };

    let first = collect(archive(make(), "a.zip", None)).await.unwrap();
    let second = collect(archive(make(), "a.zip", None)).await.unwrap();

    assert_eq!(first[0].bytes(), second[0].bytes());
}

#[tokio::test]
async fn archive___source_maps___lifted_into_bundle_tag() {
    let compiled = FileRecord::buffer("companion.js", Bytes::from_static(b"code")).with_metadata(
        Metadata {
            component: Some(ComponentType::Companion),
            entry_point: true,
            source_map: Some(SourceMap {
                contents: Bytes::from_static(b"{}"),
            }),
            ..Metadata::default()
        },
    );

    let records = collect(archive(
        from_records([compiled]),
        "companion.zip",
        Some(BundleKind::Companion),
    ))
    .await
    .unwrap();

    let tag = records[0].metadata.bundle.as_ref().unwrap();
    assert_eq!(tag.kind, BundleKind::Companion);
    assert_eq!(tag.source_maps.len(), 1);
    assert_eq!(tag.source_maps[0].file, "companion.js");
    assert_eq!(tag.source_maps[0].component, ComponentType::Companion);

    let zip = read_zip(records[0].bytes().unwrap());
    assert_eq!(zip.len(), 1);
}
