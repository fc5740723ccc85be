#![allow(non_snake_case)]

use super::*;
use chrono::{TimeZone, Utc};
use wristkit_core::ComponentType;

fn plain() -> DiagnosticRenderer {
    DiagnosticRenderer::new().with_colors(false)
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 4, 9).unwrap()
}

#[test]
fn DiagnosticRenderer___warning_with_target___prefixed_line() {
    let diagnostic = Diagnostic::warning("Icon file missing").with_target(ComponentType::Device);

    let line = plain().render_at(&diagnostic, noon());

    assert_eq!(line, "[12:04:09] device warning: Icon file missing");
}

#[test]
fn DiagnosticRenderer___no_target___build_label() {
    let line = plain().render_at(&Diagnostic::error("Unknown build target: mercury"), noon());

    assert_eq!(line, "[12:04:09] build error: Unknown build target: mercury");
}

#[test]
fn DiagnosticRenderer___context_lines___indented() {
    let diagnostic = Diagnostic::warning("No companion entry point found")
        .with_context("Checked: companion/index.ts, companion/index.js")
        .with_target(ComponentType::Companion);

    let line = plain().with_timestamps(false).render_at(&diagnostic, noon());

    assert_eq!(
        line,
        "companion warning: No companion entry point found\n    Checked: companion/index.ts, companion/index.js"
    );
}

#[test]
fn DiagnosticRenderer___position___between_target_and_category() {
    let diagnostic = Diagnostic::error("Cannot find name 'foo'")
        .with_target(ComponentType::Settings)
        .with_position("settings/index.tsx", 3, 14);

    let line = plain().with_timestamps(false).render_at(&diagnostic, noon());

    assert_eq!(
        line,
        "settings settings/index.tsx:3:14: error: Cannot find name 'foo'"
    );
}

#[test]
fn DiagnosticRenderer___colors___message_text_unchanged() {
    colored::control::set_override(true);
    let diagnostic = Diagnostic::error("broken");

    let line = DiagnosticRenderer::new().render_at(&diagnostic, noon());

    assert!(line.contains("\u{1b}["));
    assert!(line.ends_with(": broken"));
}

#[test]
fn DiagnosticRenderer___write_all___one_line_each() {
    let diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::warning("first"));
    diagnostics.push(Diagnostic::message("second"));
    let mut out = Vec::new();

    plain().with_timestamps(false).write_all(&diagnostics, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "build warning: first\nbuild message: second\n"
    );
}

#[test]
fn summary___pluralizes() {
    let diagnostics = Diagnostics::new();
    diagnostics.push(Diagnostic::error("a"));
    diagnostics.push(Diagnostic::warning("b"));
    diagnostics.push(Diagnostic::warning("c"));

    assert_eq!(summary(&diagnostics), "1 error, 2 warnings");
    assert_eq!(summary(&Diagnostics::new()), "0 errors, 0 warnings");
}
