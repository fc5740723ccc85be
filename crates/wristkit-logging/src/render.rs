//! Human-readable diagnostic output

use chrono::{DateTime, Local, Timelike};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use wristkit_core::{Category, Diagnostic, Diagnostics};

/// Label used when a diagnostic is not tied to a component
const BUILD_TARGET: &str = "build";

/// Renders diagnostics as
/// `[HH:MM:SS] <target> <category>: <message>` with indented context lines.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticRenderer {
    use_colors: bool,
    timestamps: bool,
}

impl DiagnosticRenderer {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            timestamps: true,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        self.render_at(diagnostic, Local::now())
    }

    pub fn render_at<Tz: chrono::TimeZone>(
        &self,
        diagnostic: &Diagnostic,
        time: DateTime<Tz>,
    ) -> String {
        let mut out = String::new();
        if self.timestamps {
            let stamp = format!(
                "[{:02}:{:02}:{:02}]",
                time.hour(),
                time.minute(),
                time.second()
            );
            out.push_str(&self.paint(&stamp, |s| s.dimmed()));
            out.push(' ');
        }

        let target = diagnostic
            .target
            .map_or(BUILD_TARGET, |target| target.as_str());
        out.push_str(&self.paint(target, |s| s.cyan()));
        out.push(' ');

        if let Some(position) = &diagnostic.position {
            out.push_str(&format!(
                "{}:{}:{}: ",
                position.file, position.line, position.column
            ));
        }

        let category = diagnostic.category.to_string();
        out.push_str(&match diagnostic.category {
            Category::Error => self.paint(&category, |s| s.red().bold()),
            Category::Warning => self.paint(&category, |s| s.yellow().bold()),
            Category::Message => category,
        });
        out.push_str(": ");
        out.push_str(diagnostic.primary());

        for line in diagnostic.context() {
            out.push_str("\n    ");
            out.push_str(line);
        }
        out
    }

    /// Write every collected diagnostic, one per line
    pub fn write_all(&self, diagnostics: &Diagnostics, out: &mut impl Write) -> io::Result<()> {
        for diagnostic in diagnostics.entries() {
            writeln!(out, "{}", self.render(&diagnostic))?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line count of errors and warnings, e.g. `1 error, 2 warnings`
pub fn summary(diagnostics: &Diagnostics) -> String {
    let errors = diagnostics.count(Category::Error);
    let warnings = diagnostics.count(Category::Warning);
    format!(
        "{errors} {}, {warnings} {}",
        if errors == 1 { "error" } else { "errors" },
        if warnings == 1 { "warning" } else { "warnings" }
    )
}

#[cfg(test)]
#[path = "render/render_tests.rs"]
mod render_tests;
