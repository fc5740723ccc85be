//! Structured build diagnostics
//!
//! Diagnostics are append-only. Pushing an error-category diagnostic sets a
//! sticky `fatal_error` flag that is never cleared.

use crate::ComponentType;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Message,
    Warning,
    Error,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Message => f.write_str("message"),
            Category::Warning => f.write_str("warning"),
            Category::Error => f.write_str("error"),
        }
    }
}

/// Position within a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// A single user-facing build message.
///
/// `message` holds a primary line followed by optional context lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: Category,
    pub message: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ComponentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<SourcePosition>,
}

impl Diagnostic {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: vec![message.into()],
            target: None,
            position: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(Category::Message, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Category::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Category::Error, message)
    }

    /// Append an indented context line
    pub fn with_context(mut self, line: impl Into<String>) -> Self {
        self.message.push(line.into());
        self
    }

    pub fn with_target(mut self, target: ComponentType) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_position(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.position = Some(SourcePosition {
            file: file.into(),
            line,
            column,
        });
        self
    }

    /// The primary message line
    pub fn primary(&self) -> &str {
        self.message.first().map(String::as_str).unwrap_or_default()
    }

    /// Context lines following the primary line
    pub fn context(&self) -> &[String] {
        self.message.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(target) = self.target {
            write!(f, "[{target}] ")?;
        }
        if let Some(pos) = &self.position {
            write!(f, "{}:{}:{}: ", pos.file, pos.line, pos.column)?;
        }
        write!(f, "{}: {}", self.category, self.primary())?;
        for line in self.context() {
            write!(f, "\n    {line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DiagnosticsState {
    entries: Vec<Diagnostic>,
    fatal_error: bool,
}

/// Shared, append-only diagnostic log for one build
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    state: Arc<Mutex<DiagnosticsState>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and forward it to the tracing log
    pub fn push(&self, diagnostic: Diagnostic) {
        match diagnostic.category {
            Category::Error => tracing::error!(target: "wristkit::diagnostic", "{diagnostic}"),
            Category::Warning => tracing::warn!(target: "wristkit::diagnostic", "{diagnostic}"),
            Category::Message => tracing::info!(target: "wristkit::diagnostic", "{diagnostic}"),
        }

        let mut state = self.state.lock();
        if diagnostic.category == Category::Error {
            state.fatal_error = true;
        }
        state.entries.push(diagnostic);
    }

    pub fn extend(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Whether any error has been recorded
    pub fn fatal_error(&self) -> bool {
        self.state.lock().fatal_error
    }

    /// Snapshot of everything recorded so far, in order
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.state.lock().entries.clone()
    }

    pub fn count(&self, category: Category) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|d| d.category == category)
            .count()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "diagnostic/diagnostic_tests.rs"]
mod diagnostic_tests;
