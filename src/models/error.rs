//! Error types for ahdaf.
//!
//! Epistemic taxonomy:
//! - B_i falsified: Expected failures (bad config, bad curriculum file)
//! - I^B materialized: Infrastructure failures (network, auth, quota)
//!
//! A model reply that does not match the objectives schema is NOT an error
//! here; the generator contains it and yields an empty result.

use thiserror::Error;

/// Top-level error type for ahdaf.
#[derive(Debug, Error)]
pub enum AhdafError {
    // ═══════════════════════════════════════════════════════════════════
    // B_i FALSIFIED - Belief proven wrong (expected failures)
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Curriculum error: {0}")]
    Curriculum(String),

    // ═══════════════════════════════════════════════════════════════════
    // I^B MATERIALIZED - Bounded ignorance became known-bad
    // ═══════════════════════════════════════════════════════════════════

    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Gemini API specific errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Authentication failed: invalid or missing API key")]
    AuthenticationFailed,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Quota exhausted: {message}")]
    QuotaExhausted { message: String },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AhdafError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the failure happened talking to the model service.
    ///
    /// The session maps all of these to one localized message.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Gemini(_) | Self::Network(_) | Self::Timeout(_)
        )
    }
}

/// Result type alias for ahdaf.
pub type Result<T> = std::result::Result<T, AhdafError>;
