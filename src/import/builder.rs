//! Transaction payload construction.
//!
//! Assembles the wire payload for the remote ledger service from a
//! normalized row and the resolved account ids. The outbound amount is
//! always the absolute magnitude; the direction alone encodes sign.
//! Optional fields that were absent in the row are omitted from the JSON
//! entirely rather than sent as empty strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Direction, NormalizedRow};

/// One transaction group as the ledger service expects it.
///
/// `error_if_duplicate_hash` is `false`: the service is instructed to
/// ignore duplicate-hash conflicts rather than fail the request, which
/// makes re-posting the same import idempotent from our side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionPayload {
    pub error_if_duplicate_hash: bool,
    pub transactions: Vec<TransactionSplit>,
}

/// A single transaction split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionSplit {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub date: NaiveDate,
    /// Absolute magnitude, serialized as a plain decimal string.
    pub amount: String,
    pub description: String,
    pub source_id: String,
    pub destination_id: String,
    pub currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Build the outbound payload for one normalized row.
pub fn build_payload(
    row: &NormalizedRow,
    source_id: &str,
    destination_id: &str,
    currency: &str,
) -> TransactionPayload {
    TransactionPayload {
        error_if_duplicate_hash: false,
        transactions: vec![TransactionSplit {
            direction: row.direction,
            date: row.date,
            amount: row.amount.abs().to_string(),
            description: row.description.clone(),
            source_id: source_id.to_string(),
            destination_id: destination_id.to_string(),
            currency_code: currency.to_string(),
            notes: row.notes.clone(),
            external_id: row.external_id.clone(),
            tags: row.tags.clone(),
            category_name: row.category.clone(),
        }],
    }
}
