// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Charla bridge.

use thiserror::Error;

/// The primary error type used across all Charla crates.
#[derive(Debug, Error)]
pub enum CharlaError {
    /// Configuration errors (missing credentials, inbox mismatch, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chatwoot API errors (non-2xx response, transport failure, unexpected payload shape).
    #[error("chatwoot error: {message}")]
    Chatwoot {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Chat-network provider errors (send failure, media persistence failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Media resolution errors (download failure, missing file, unreadable payload).
    #[error("media error: {message}")]
    Media {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out (bounded waits on the conversation-creation lock).
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CharlaError {
    /// Builds a [`CharlaError::Chatwoot`] carrying endpoint context and the upstream error.
    pub fn chatwoot(
        endpoint: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Chatwoot {
            message: format!("request to {endpoint} failed: {source}"),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`CharlaError::Media`] from a message and upstream error.
    pub fn media(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Media {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
