//! Entry-point resolution

use std::path::PathBuf;
use wristkit_core::{BuildError, BuildResult, ComponentType, Diagnostic, Diagnostics};

const PLUGIN: &str = "entry-point";

/// Picks the single existing entry file among a component's candidates
#[derive(Debug, Clone)]
pub struct EntryPointResolver {
    root: PathBuf,
}

impl EntryPointResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the entry point for `component`.
    ///
    /// Returns `Ok(None)` after pushing one warning when nothing exists and
    /// `not_found_is_fatal` is false. More than one existing candidate is
    /// always an error.
    pub fn resolve(
        &self,
        candidates: &[&str],
        not_found_is_fatal: bool,
        component: ComponentType,
        diagnostics: &Diagnostics,
    ) -> BuildResult<Option<String>> {
        let found: Vec<&str> = candidates
            .iter()
            .copied()
            .filter(|candidate| self.root.join(candidate).is_file())
            .collect();

        match found.as_slice() {
            [entry] => {
                tracing::debug!(%component, entry, "entry point resolved");
                Ok(Some(entry.to_string()))
            }
            [] if not_found_is_fatal => Err(BuildError::fatal(
                PLUGIN,
                format!(
                    "No {component} entry point found. Checked: {}",
                    candidates.join(", ")
                ),
            )),
            [] => {
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "No {component} entry point found, skipping {component} build"
                    ))
                    .with_context(format!("Checked: {}", candidates.join(", ")))
                    .with_target(component),
                );
                Ok(None)
            }
            _ => Err(BuildError::fatal(
                PLUGIN,
                format!(
                    "Multiple {component} entry points found: {}",
                    found.join(", ")
                ),
            )),
        }
    }
}

#[cfg(test)]
#[path = "entry_point/entry_point_tests.rs"]
mod entry_point_tests;
