//! Row normalization: raw CSV values to a typed [`NormalizedRow`].
//!
//! Applies the column mapping, validates the five required fields, parses
//! the date against an ordered format list, and cleans/parses the amount.
//! Optional fields come out as `None` when unmapped or blank so the payload
//! builder can omit them entirely.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::RowErrorKind;
use crate::models::{ColumnMapping, Direction, NormalizedRow, RawRow};

/// Accepted date formats, tried in order. ISO first, then common locale
/// variants; the first successful match wins.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
];

/// Strips currency symbols, spaces, and thousands separators before
/// decimal parsing. The leading sign survives.
static AMOUNT_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$€£¥,\s]").expect("valid amount-cleaning regex"));

/// Normalize one raw row against the mapping.
///
/// Fails with a row-level error when a required field is missing/blank, the
/// date matches no accepted format, or the amount is unparsable or zero.
pub fn normalize_row(row: &RawRow, mapping: &ColumnMapping) -> Result<NormalizedRow, RowErrorKind> {
    let date_str = required_value(row, &mapping.date, "date")?;
    let amount_str = required_value(row, &mapping.amount, "amount")?;
    let description = required_value(row, &mapping.description, "description")?;
    let source_account = required_value(row, &mapping.source_account, "source_account")?;
    let destination_account =
        required_value(row, &mapping.destination_account, "destination_account")?;

    let date = parse_date(&date_str)?;
    let amount = parse_amount(&amount_str)?;

    let type_text = optional_value(row, &mapping.transaction_type);
    let direction = Direction::from_text(type_text.as_deref());

    let tags = optional_value(row, &mapping.tags).map(|raw| split_tags(&raw));
    let tags = tags.filter(|t| !t.is_empty());

    Ok(NormalizedRow {
        date,
        amount,
        description,
        source_account,
        destination_account,
        direction,
        category: optional_value(row, &mapping.category),
        tags,
        notes: optional_value(row, &mapping.notes),
        external_id: optional_value(row, &mapping.external_id),
    })
}

/// Fetch a required mapped value, trimmed; missing or blank fails the row.
fn required_value(
    row: &RawRow,
    column: &Option<String>,
    field: &str,
) -> Result<String, RowErrorKind> {
    match optional_value(row, column) {
        Some(value) => Ok(value),
        None => Err(RowErrorKind::MissingField {
            field: field.to_string(),
        }),
    }
}

/// Fetch an optional mapped value, trimmed. `None` when the field is
/// unmapped, the column is absent from the row, or the value is blank.
fn optional_value(row: &RawRow, column: &Option<String>) -> Option<String> {
    let column = column.as_deref()?.trim();
    if column.is_empty() {
        return None;
    }
    let value = row.get(column)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Try each accepted format in order; first match wins.
fn parse_date(value: &str) -> Result<NaiveDate, RowErrorKind> {
    let trimmed = value.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(RowErrorKind::InvalidDate {
        value: value.to_string(),
    })
}

/// Clean symbols/separators and parse as a signed decimal; zero is rejected.
fn parse_amount(value: &str) -> Result<Decimal, RowErrorKind> {
    let cleaned = AMOUNT_NOISE.replace_all(value, "");
    let amount: Decimal = cleaned.parse().map_err(|_| RowErrorKind::InvalidAmount {
        value: value.to_string(),
    })?;

    if amount.is_zero() {
        return Err(RowErrorKind::ZeroAmount);
    }
    Ok(amount)
}

/// Split a raw tags value on commas, trimming and dropping empties.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}
