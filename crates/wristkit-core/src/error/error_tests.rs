#![allow(non_snake_case)]

use super::*;

#[test]
fn BuildError___fatal_at___displays_plugin_and_path() {
    let err = BuildError::fatal_at("translations", "i18n/en-US.po", "duplicate language");

    assert_eq!(
        err.to_string(),
        "translations: i18n/en-US.po: duplicate language"
    );
    assert_eq!(err.path(), Some("i18n/en-US.po"));
}

#[test]
fn BuildError___fatal_without_path___omits_path() {
    let err = BuildError::fatal("device-manifest", "no entry point");

    assert_eq!(err.to_string(), "device-manifest: no entry point");
    assert_eq!(err.path(), None);
}

#[test]
fn BuildError___project_errors___classified() {
    assert!(BuildError::fatal("x", "y").is_project_error());
    assert!(BuildError::Config("bad".into()).is_project_error());
    assert!(BuildError::Compiler("bad".into()).is_project_error());
}

#[test]
fn BuildError___toolchain_errors___not_project_errors() {
    let io: BuildError = std::io::Error::other("disk").into();

    assert!(!io.is_project_error());
    assert!(!BuildError::internal("regex").is_project_error());
    assert!(!BuildError::Cancelled.is_project_error());
}

#[test]
fn BuildError___exit_code___distinguishes_project_from_toolchain() {
    assert_eq!(BuildError::fatal("x", "y").exit_code(), 1);
    assert_eq!(BuildError::internal("z").exit_code(), 2);
}

#[test]
fn BuildError___from_serde_error___converts_to_json() {
    let json_err = serde_json::from_str::<String>("invalid").unwrap_err();

    let err: BuildError = json_err.into();

    assert!(matches!(err, BuildError::Json(_)));
}

#[test]
fn BuildError___through_io_error___keeps_attribution() {
    let io: std::io::Error = BuildError::fatal_at("image", "resources/broken.png", "bad png").into();

    let err = BuildError::from(io);

    assert!(err.is_project_error());
    assert_eq!(err.path(), Some("resources/broken.png"));
    assert_eq!(err.to_string(), "image: resources/broken.png: bad png");
}

#[test]
fn BuildError___plain_io_error___stays_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");

    let err = BuildError::from(io);

    assert!(matches!(err, BuildError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
}

#[test]
fn BuildError___tool_unavailable___toolchain_exit_code() {
    let err = BuildError::ToolUnavailable("failed to run compile".into());

    assert!(!err.is_project_error());
    assert_eq!(err.exit_code(), 2);
}
