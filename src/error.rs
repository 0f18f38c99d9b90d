//! Application error type.
//!
//! One enum covers the whole pipeline so the binary can map every failure to
//! a stable exit code. The variants mirror the failure taxonomy of the fetch
//! pipeline: transport exhaustion (retryable, budgeted), malformed provider
//! data (never retried), unknown registry lookups, and missing credentials.

use thiserror::Error;

/// Failure reported by a provider transport (network, timeout, HTTP status).
///
/// Kept as a separate type so the retry loop can only ever retry transport
/// failures; normalizer errors are `AppError::MalformedData` and propagate
/// immediately.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Classifies why a provider response failed normalization.
///
/// The "no data" kinds are a valid absence for callers that sweep many
/// series (the tidy builder skips them); the structural kinds always abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// No header matched the date-column aliases.
    MissingDateColumn,
    /// No header matched the value-column aliases.
    MissingValueColumn,
    /// The response carried no observation rows at all.
    NoObservations,
    /// Every date cell failed to parse (wrong column entirely).
    InvalidDates,
    /// Rows were present but none survived parsing.
    Empty,
}

impl MalformedKind {
    /// True when the failure means "this series has no data" rather than
    /// "this response is structurally broken".
    pub fn is_empty_data(self) -> bool {
        matches!(self, MalformedKind::NoObservations | MalformedKind::Empty)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing credential: set {var} in the environment (or .env)")]
    MissingCredential { var: &'static str },

    #[error("unknown series '{name}'; valid options: {known}")]
    UnknownSeries { name: String, known: String },

    #[error("fetching {key} failed after {attempts} attempt(s): {cause}")]
    FetchExhausted {
        key: String,
        attempts: u32,
        cause: TransportError,
    },

    #[error("malformed data for {key}: {detail}")]
    MalformedData {
        key: String,
        kind: MalformedKind,
        detail: String,
    },

    #[error("{context}: {message}")]
    Io { context: String, message: String },

    #[error("terminal error: {message}")]
    Terminal { message: String },
}

impl AppError {
    pub fn io(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AppError::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn terminal(err: impl std::fmt::Display) -> Self {
        AppError::Terminal {
            message: err.to_string(),
        }
    }

    pub fn malformed(
        key: impl Into<String>,
        kind: MalformedKind,
        detail: impl Into<String>,
    ) -> Self {
        AppError::MalformedData {
            key: key.into(),
            kind,
            detail: detail.into(),
        }
    }

    /// Exit code for the binary: 2 = usage/config, 3 = transport, 4 = data.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingCredential { .. } => 2,
            AppError::UnknownSeries { .. } => 2,
            AppError::Io { .. } => 2,
            AppError::FetchExhausted { .. } => 3,
            AppError::MalformedData { .. } => 4,
            AppError::Terminal { .. } => 4,
        }
    }
}
