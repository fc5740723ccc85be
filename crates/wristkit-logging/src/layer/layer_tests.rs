#![allow(non_snake_case)]

use super::*;

#[test]
fn env_filter___unset___hides_diagnostics() {
    let filter = env_filter(None).to_string();

    assert!(filter.contains("wristkit::diagnostic=off"));
}

#[test]
fn env_filter___blank___same_as_unset() {
    let filter = env_filter(Some("   ")).to_string();

    assert!(filter.contains("wristkit::diagnostic=off"));
}

#[test]
fn env_filter___directives___used_verbatim() {
    let filter = env_filter(Some("wristkit_build=debug")).to_string();

    assert!(filter.contains("wristkit_build=debug"));
    assert!(!filter.contains("wristkit::diagnostic"));
}

#[test]
fn env_filter___invalid_level___falls_back_to_trace() {
    let filter = env_filter(Some("wristkit=verbose"));

    assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
}
