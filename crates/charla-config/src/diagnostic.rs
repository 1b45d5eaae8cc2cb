// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic error type for configuration failures, rendered via miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic help text.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Deserialization failed (unknown key, wrong type, malformed TOML).
    #[error("could not parse configuration: {message}")]
    #[diagnostic(
        code(charla::config::parse),
        help("check charla.toml and CHARLA_*/CHATWOOT_* environment variables")
    )]
    Parse {
        /// The underlying figment error description.
        message: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(charla::config::missing_key),
        help("set `{key}` in charla.toml or export {env_hint}")
    )]
    MissingKey {
        /// The missing key name (dotted path).
        key: String,
        /// The environment variable that would supply it.
        env_hint: String,
    },

    /// A semantic validation error.
    #[error("validation error: {message}")]
    #[diagnostic(code(charla::config::validation))]
    Validation { message: String },
}

/// Render configuration errors to stderr with miette's fancy reporter.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::msg(format!("{error}"));
        let report = match error.help() {
            Some(help) => report.wrap_err(format!("help: {help}")),
            None => report,
        };
        eprintln!("{report:?}");
    }
    eprintln!(
        "charla: {} configuration error{} found",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}
