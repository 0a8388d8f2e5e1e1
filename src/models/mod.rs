//! Domain models for the Ledgerload import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RawRow`] - One CSV data line as column-name/value pairs
//! - [`ColumnMapping`] - Canonical field to source column mapping
//! - [`NormalizedRow`] - A validated, typed transaction row
//! - [`Direction`] - Transaction class (withdrawal/deposit/transfer)
//! - [`AccountType`] - Ledger-side account classification
//! - [`AccountKey`] - Case-insensitive identity of an account within a run
//! - [`ImportResult`] - Aggregated outcome of one import run

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RowErrorKind};

// =============================================================================
// Raw Input
// =============================================================================

/// One CSV data line: source column name to raw string value.
///
/// Produced by the parser (or received verbatim over the API) and never
/// mutated; all interpretation happens in the normalizer.
pub type RawRow = HashMap<String, String>;

// =============================================================================
// Column Mapping
// =============================================================================

/// Maps canonical transaction fields to source CSV column names.
///
/// Supplied once per import. The five required entries must be present and
/// non-empty or the whole import is rejected before any row is touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_account: Option<String>,
    #[serde(default)]
    pub destination_account: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Column holding the free-text transaction type, if any.
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
}

impl ColumnMapping {
    /// Canonical names of the required mapping entries, in reporting order.
    pub const REQUIRED_FIELDS: [&'static str; 5] = [
        "date",
        "amount",
        "description",
        "source_account",
        "destination_account",
    ];

    /// Check that every required entry is mapped to a non-empty column name.
    ///
    /// Reports the first missing field in [`Self::REQUIRED_FIELDS`] order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = [
            ("date", &self.date),
            ("amount", &self.amount),
            ("description", &self.description),
            ("source_account", &self.source_account),
            ("destination_account", &self.destination_account),
        ];

        for (field, column) in entries {
            if column.as_deref().map_or(true, |c| c.trim().is_empty()) {
                return Err(ConfigError::MissingMappingField(field.to_string()));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Transaction class, determining which account type plays source vs.
/// destination role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Withdrawal,
    Deposit,
    Transfer,
}

impl Direction {
    /// Infer the direction from free-text type labels.
    ///
    /// CSV data from varied sources carries inconsistent labels, so
    /// unrecognized or absent text falls back to `Withdrawal` rather
    /// than failing the row.
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("withdrawal") | Some("expense") => Direction::Withdrawal,
            Some("deposit") | Some("income") => Direction::Deposit,
            Some("transfer") => Direction::Transfer,
            _ => Direction::Withdrawal,
        }
    }

    /// Wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Withdrawal => "withdrawal",
            Direction::Deposit => "deposit",
            Direction::Transfer => "transfer",
        }
    }
}

// =============================================================================
// Account Type
// =============================================================================

/// Ledger-side account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Expense,
    Revenue,
}

impl AccountType {
    /// Wire name of the account type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Expense => "expense",
            AccountType::Revenue => "revenue",
        }
    }
}

// =============================================================================
// Account Key
// =============================================================================

/// Identity of a ledger account within one import run.
///
/// Name comparison is case-insensitive: the key stores the lowercased
/// trimmed name so `"Checking"` and `"checking"` resolve to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountKey {
    pub name: String,
    pub kind: AccountType,
}

impl AccountKey {
    pub fn new(name: &str, kind: AccountType) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            kind,
        }
    }
}

// =============================================================================
// Normalized Row
// =============================================================================

/// A raw row after mapping, validation, and typing.
///
/// Optional fields are `None` when the column was unmapped or the value was
/// blank; absence is distinguishable from an explicit empty value so the
/// payload builder can omit the field entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub date: NaiveDate,
    /// Signed, non-zero. Sign feeds classification; magnitude feeds the payload.
    pub amount: Decimal,
    pub description: String,
    pub source_account: String,
    pub destination_account: String,
    pub direction: Direction,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub external_id: Option<String>,
}

// =============================================================================
// Import Result
// =============================================================================

/// A per-row error record: 1-based row index, stable code, human reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub code: String,
    pub reason: String,
}

/// Aggregated outcome of one import run.
///
/// Built incrementally by the orchestrator; row failures are recorded here
/// and never abort the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    /// Ordered by row index, one entry per skipped row.
    pub errors: Vec<RowError>,
    /// Distinct names of accounts created during this run, sorted.
    pub accounts_created: Vec<String>,
}

impl ImportResult {
    pub fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            imported: 0,
            skipped: 0,
            errors: Vec::new(),
            accounts_created: Vec::new(),
        }
    }

    /// Record a row failure: increments `skipped` and appends the error.
    pub fn skip(&mut self, row: usize, kind: &RowErrorKind) {
        self.skipped += 1;
        self.errors.push(RowError {
            row,
            code: kind.code().to_string(),
            reason: kind.to_string(),
        });
    }

    /// Success rate as a display string, `"0%"` for empty input.
    pub fn success_rate(&self) -> String {
        if self.total_rows == 0 {
            return "0%".to_string();
        }
        format!(
            "{:.1}%",
            self.imported as f64 / self.total_rows as f64 * 100.0
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
