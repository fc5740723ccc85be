#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;
use test_case::test_case;

const CANDIDATES: &[&str] = &["app/index.ts", "app/index.js"];

fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export {};").unwrap();
    }
    dir
}

#[test_case(true ; "fatal")]
#[test_case(false ; "optional")]
fn EntryPointResolver___one_match___returns_path_without_diagnostics(fatal: bool) {
    let dir = project(&["app/index.js"]);
    let diagnostics = Diagnostics::new();

    let entry = EntryPointResolver::new(dir.path())
        .resolve(CANDIDATES, fatal, ComponentType::Device, &diagnostics)
        .unwrap();

    assert_eq!(entry.as_deref(), Some("app/index.js"));
    assert!(diagnostics.is_empty());
}

#[test]
fn EntryPointResolver___none_and_fatal___error_names_candidates() {
    let dir = project(&[]);
    let diagnostics = Diagnostics::new();

    let err = EntryPointResolver::new(dir.path())
        .resolve(CANDIDATES, true, ComponentType::Device, &diagnostics)
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("app/index.ts"));
    assert!(message.contains("app/index.js"));
    assert!(err.is_project_error());
}

#[test]
fn EntryPointResolver___none_and_optional___one_warning() {
    let dir = project(&[]);
    let diagnostics = Diagnostics::new();

    let entry = EntryPointResolver::new(dir.path())
        .resolve(
            &["companion/index.ts", "companion/index.js"],
            false,
            ComponentType::Companion,
            &diagnostics,
        )
        .unwrap();

    assert!(entry.is_none());
    let entries = diagnostics.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, wristkit_core::Category::Warning);
    assert_eq!(entries[0].target, Some(ComponentType::Companion));
    assert!(!diagnostics.fatal_error());
}

#[test_case(true ; "fatal")]
#[test_case(false ; "optional")]
fn EntryPointResolver___two_matches___always_fatal(fatal: bool) {
    let dir = project(&["app/index.ts", "app/index.js"]);
    let diagnostics = Diagnostics::new();

    let err = EntryPointResolver::new(dir.path())
        .resolve(CANDIDATES, fatal, ComponentType::Device, &diagnostics)
        .unwrap_err();

    assert!(err.to_string().contains("Multiple device entry points"));
}

#[test]
fn EntryPointResolver___directory_named_like_candidate___ignored() {
    let dir = project(&[]);
    fs::create_dir_all(dir.path().join("app/index.js")).unwrap();
    let diagnostics = Diagnostics::new();

    let entry = EntryPointResolver::new(dir.path())
        .resolve(CANDIDATES, false, ComponentType::Device, &diagnostics)
        .unwrap();

    assert!(entry.is_none());
}
