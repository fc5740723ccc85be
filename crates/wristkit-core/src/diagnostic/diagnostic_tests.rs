#![allow(non_snake_case)]

use super::*;

#[test]
fn Diagnostic___with_context___keeps_primary_first() {
    let diagnostic = Diagnostic::error("Multiple entry points")
        .with_context("app/index.ts")
        .with_context("app/index.js");

    assert_eq!(diagnostic.primary(), "Multiple entry points");
    assert_eq!(diagnostic.context(), ["app/index.ts", "app/index.js"]);
}

#[test]
fn Diagnostic___display___includes_target_and_position() {
    let diagnostic = Diagnostic::warning("unused variable")
        .with_target(ComponentType::Companion)
        .with_position("companion/index.ts", 3, 7);

    assert_eq!(
        diagnostic.to_string(),
        "[companion] companion/index.ts:3:7: warning: unused variable"
    );
}

#[test]
fn Diagnostic___display___indents_context() {
    let diagnostic = Diagnostic::message("built").with_context("device-atlas.zip");

    assert_eq!(diagnostic.to_string(), "message: built\n    device-atlas.zip");
}

#[test]
fn Diagnostics___push_warning___does_not_set_fatal() {
    let diagnostics = Diagnostics::new();

    diagnostics.push(Diagnostic::warning("missing icon"));

    assert!(!diagnostics.fatal_error());
    assert_eq!(diagnostics.count(Category::Warning), 1);
}

#[test]
fn Diagnostics___fatal_flag___never_resets() {
    let diagnostics = Diagnostics::new();

    diagnostics.push(Diagnostic::error("bad"));
    diagnostics.push(Diagnostic::message("later"));
    diagnostics.push(Diagnostic::warning("later still"));

    assert!(diagnostics.fatal_error());
}

#[test]
fn Diagnostics___clones___share_state() {
    let diagnostics = Diagnostics::new();
    let handle = diagnostics.clone();

    handle.push(Diagnostic::message("one"));
    handle.extend([Diagnostic::message("two"), Diagnostic::message("three")]);

    let primaries: Vec<String> = diagnostics
        .entries()
        .iter()
        .map(|d| d.primary().to_string())
        .collect();
    assert_eq!(primaries, ["one", "two", "three"]);
}
