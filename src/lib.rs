//! # Ledgerload - CSV transaction import for remote ledger services
//!
//! Ledgerload ingests CSV files of financial transactions and reconciles
//! them against a remote ledger service, creating missing accounts and
//! posting transactions idempotently.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser   │────▶│   Import   │────▶│   Ledger    │
//! │  (auto-enc) │     │ (RawRows)  │     │  Pipeline  │     │   Service   │
//! └─────────────┘     └────────────┘     └────────────┘     └─────────────┘
//! ```
//!
//! Per row: normalize (mapping + validation) → classify (direction and
//! account types) → resolve accounts (cached get-or-create) → build payload
//! → post. Row failures are isolated and aggregated; no row aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ledgerload::{parse_csv_file_auto, HttpLedgerClient, ImportConfig, Importer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImportConfig::from_env()?;
//!     let client = HttpLedgerClient::new(&config)?;
//!     let parsed = parse_csv_file_auto("transactions.csv")?;
//!
//!     let importer = Importer::new(&client, config.default_currency.clone());
//!     let result = importer.run(&parsed.rows, &mapping).await?;
//!     println!("Imported {} of {}", result.imported, result.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (rows, mapping, directions, results)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`import`] - The import pipeline (normalize, classify, resolve, post)
//! - [`ledger`] - Remote ledger capability and HTTP client
//! - [`config`] - Run configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Import pipeline
pub mod import;

// Remote ledger
pub mod ledger;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    AccountSide, ConfigError, CsvError, ImportError, RemoteError, RowErrorKind,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AccountKey, AccountType, ColumnMapping, Direction, ImportResult, NormalizedRow, RawRow,
    RowError,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_str, ParseResult,
};

// =============================================================================
// Re-exports - Import Pipeline
// =============================================================================

pub use import::{
    build_payload, classify, normalize_row, AccountResolver, Classification, Importer,
    TransactionPayload, TransactionSplit,
};

// =============================================================================
// Re-exports - Ledger
// =============================================================================

pub use ledger::http::HttpLedgerClient;
pub use ledger::{AccountSummary, LedgerService};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::ImportConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
