// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics rendered via miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error carrying enough context for an actionable message.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    #[error("could not load configuration: {0}")]
    #[diagnostic(
        code(leadflow::config::parse),
        help("check leadflow.toml (and LEADFLOW_* environment overrides) against the documented sections: engine, storage, routing, escalation, notify, reputation")
    )]
    Parse(#[from] figment::Error),

    /// A semantic constraint on a parsed value was violated.
    #[error("validation error: {message}")]
    #[diagnostic(code(leadflow::config::validation))]
    Validation { message: String },
}

/// Print collected configuration errors to stderr.
///
/// All errors are rendered, not just the first, so a user can fix a config
/// file in one pass.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("error: {err}");
        if let Some(help) = err.help() {
            eprintln!("  help: {help}");
        }
    }
}
