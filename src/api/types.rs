//! REST API request/response types.
//!
//! The wire format is stable for UI consumption: per-row errors keep their
//! 1-based indices and reason strings exactly as the pipeline produced
//! them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ColumnMapping, ImportResult, RawRow};

/// Body of `POST /api/import`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    pub rows: Vec<RawRow>,
    pub mapping: ColumnMapping,
}

/// Response of `POST /api/import`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    /// Unique job identifier.
    pub job_id: String,
    /// `"completed"` when every row imported, `"partial"` otherwise.
    pub status: String,
    /// Full per-row detail.
    pub results: ImportResult,
    /// Headline numbers for the UI.
    pub summary: ImportSummary,
}

/// Headline counters for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped: usize,
    pub accounts_created: usize,
    pub success_rate: String,
}

impl From<ImportResult> for ImportResponse {
    fn from(results: ImportResult) -> Self {
        let summary = ImportSummary {
            total_rows: results.total_rows,
            imported: results.imported,
            skipped: results.skipped,
            accounts_created: results.accounts_created.len(),
            success_rate: results.success_rate(),
        };

        ImportResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if results.skipped == 0 { "completed" } else { "partial" }.to_string(),
            results,
            summary,
        }
    }
}

/// Response of `POST /api/parse-csv`.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub columns: Vec<String>,
    pub encoding: String,
    pub delimiter: String,
    pub total_rows: usize,
    /// First rows for the mapping UI.
    pub preview: Vec<RawRow>,
    pub rows: Vec<RawRow>,
}

/// Response of `GET /api/config`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    pub configured: bool,
    pub base_url: String,
    pub default_currency: String,
}

/// Uniform error body.
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}
