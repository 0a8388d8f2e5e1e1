//! Error types for the Ledgerload import pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ConfigError`] - Missing mapping fields or run configuration
//! - [`CsvError`] - CSV decoding and parsing errors
//! - [`RowErrorKind`] - Per-row failures recovered into the import result
//! - [`RemoteError`] - Transport/status failures from the ledger service
//! - [`ImportError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Row-level errors are
//! never propagated past a single row: the orchestrator records them
//! and moves on.

use thiserror::Error;

// =============================================================================
// Configuration Errors (fatal to the whole run)
// =============================================================================

/// Errors in the run configuration, surfaced before any row is processed.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required column-mapping entry is missing or empty.
    #[error("Mapping missing required field: {0}")]
    MissingMappingField(String),

    /// A required environment variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV decoding and parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the byte content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid CSV structure.
    #[error("Invalid CSV format: {0}")]
    Parse(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Parse(err.to_string())
    }
}

// =============================================================================
// Remote Service Errors
// =============================================================================

/// A failed call to the remote ledger service.
///
/// `status` is `None` for transport-level failures (connection refused,
/// timeout); otherwise it carries the non-2xx HTTP status. `message` is the
/// remote-reported error when one could be parsed from the response body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    /// A transport-level failure with no HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    /// A non-2xx response with a parsed or fallback message.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }
}

// =============================================================================
// Row-Level Errors (recovered, never fatal)
// =============================================================================

/// Which side of a transaction an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSide {
    Source,
    Destination,
}

impl std::fmt::Display for AccountSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountSide::Source => write!(f, "Source"),
            AccountSide::Destination => write!(f, "Destination"),
        }
    }
}

/// A failure confined to a single row.
///
/// Every variant carries enough context for a human-readable reason via
/// `Display`, and a stable machine-readable [`code`](RowErrorKind::code) for
/// callers that match on failure classes.
#[derive(Debug, Clone, Error)]
pub enum RowErrorKind {
    /// A required mapped field resolved to a missing or blank value.
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    /// The date value matched none of the accepted formats.
    #[error("Invalid date format: {value}")]
    InvalidDate { value: String },

    /// The amount value did not parse as a decimal after cleaning.
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// The amount parsed to exactly zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Account lookup or creation failed for this row.
    #[error("{side} account error: {message}")]
    Account { side: AccountSide, message: String },

    /// The remote service rejected the transaction post.
    #[error("Transaction post failed: {message}")]
    Post { message: String },

    /// An unexpected transport failure, recovered at row granularity.
    #[error("Processing error: {message}")]
    Processing { message: String },
}

impl RowErrorKind {
    /// Stable machine-readable code for this failure class.
    pub fn code(&self) -> &'static str {
        match self {
            RowErrorKind::MissingField { .. } => "missing_required_field",
            RowErrorKind::InvalidDate { .. } => "invalid_date",
            RowErrorKind::InvalidAmount { .. } => "invalid_amount",
            RowErrorKind::ZeroAmount => "zero_amount",
            RowErrorKind::Account { .. } => "account_error",
            RowErrorKind::Post { .. } => "post_error",
            RowErrorKind::Processing { .. } => "processing_error",
        }
    }

    /// Wrap a remote failure during account resolution.
    pub fn account(side: AccountSide, err: RemoteError) -> Self {
        RowErrorKind::Account { side, message: err.message }
    }

    /// Wrap a remote failure during transaction posting.
    ///
    /// Status failures carry the remote-reported message; transport
    /// failures degrade to a generic processing error.
    pub fn post(err: RemoteError) -> Self {
        match err.status {
            Some(_) => RowErrorKind::Post { message: err.message },
            None => RowErrorKind::Processing { message: err.message },
        }
    }
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level errors for the CLI and server fronts.
///
/// Row-level failures never surface here; they are aggregated into the
/// import result instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Remote service error outside row processing (e.g. connection test).
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for remote ledger calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ConfigError -> ImportError
        let config_err = ConfigError::MissingMappingField("date".into());
        let import_err: ImportError = config_err.into();
        assert!(import_err.to_string().contains("date"));

        // CsvError -> ImportError
        let csv_err = CsvError::EmptyFile;
        let import_err: ImportError = csv_err.into();
        assert!(import_err.to_string().contains("empty"));
    }

    #[test]
    fn test_row_error_codes() {
        let err = RowErrorKind::MissingField { field: "amount".into() };
        assert_eq!(err.code(), "missing_required_field");
        assert!(err.to_string().contains("amount"));

        assert_eq!(RowErrorKind::ZeroAmount.code(), "zero_amount");
        assert_eq!(
            RowErrorKind::InvalidDate { value: "15-15-2024".into() }.code(),
            "invalid_date"
        );
    }

    #[test]
    fn test_account_error_carries_side_and_message() {
        let remote = RemoteError::status(422, "name: must be unique");
        let err = RowErrorKind::account(AccountSide::Source, remote);
        let msg = err.to_string();
        assert!(msg.contains("Source account error"));
        assert!(msg.contains("must be unique"));
    }

    #[test]
    fn test_post_error_degrades_transport_to_processing() {
        let status = RowErrorKind::post(RemoteError::status(500, "server blew up"));
        assert_eq!(status.code(), "post_error");

        let transport = RowErrorKind::post(RemoteError::transport("connection refused"));
        assert_eq!(transport.code(), "processing_error");
        assert!(transport.to_string().contains("connection refused"));
    }
}
