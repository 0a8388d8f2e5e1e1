//! High-level import pipeline: drives each row through normalization,
//! classification, account resolution, and posting.
//!
//! Rows are processed sequentially in input order. A failure at any stage
//! aborts only that row: the orchestrator records a 1-based row index and a
//! reason, increments `skipped`, and moves on. Only a broken column mapping
//! fails the whole call, and it does so before any row is touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerload::import::Importer;
//!
//! let importer = Importer::new(&client, "USD");
//! let result = importer.run(&rows, &mapping).await?;
//! println!("{} imported, {} skipped", result.imported, result.skipped);
//! ```

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{AccountSide, ConfigError, RowErrorKind};
use crate::import::builder::build_payload;
use crate::import::classify::Classification;
use crate::import::normalize::normalize_row;
use crate::import::resolve::AccountResolver;
use crate::ledger::LedgerService;
use crate::models::{ColumnMapping, ImportResult, RawRow};

/// Drives one import run against a ledger service.
///
/// Owns nothing across runs: each call to [`run`](Importer::run) builds a
/// fresh account resolver (and thus a fresh cache), so runs never share
/// state.
pub struct Importer<'a, L> {
    client: &'a L,
    currency: String,
}

impl<'a, L: LedgerService> Importer<'a, L> {
    pub fn new(client: &'a L, currency: impl Into<String>) -> Self {
        Self {
            client,
            currency: currency.into(),
        }
    }

    /// Import all rows, returning the aggregated result.
    ///
    /// Fails only with [`ConfigError`] when the mapping is missing a
    /// required entry; every other failure is recorded per row.
    pub async fn run(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
    ) -> Result<ImportResult, ConfigError> {
        mapping.validate()?;

        let mut result = ImportResult::new(rows.len());
        let mut resolver = AccountResolver::new(self.client, self.currency.clone());

        log_info(format!("📥 Importing {} rows...", rows.len()));

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            match self.process_row(row, mapping, &mut resolver).await {
                Ok(()) => result.imported += 1,
                Err(kind) => {
                    log_warning(format!("Row {}: {}", row_number, kind));
                    result.skip(row_number, &kind);
                }
            }
        }

        result.accounts_created = resolver.into_created().into_iter().collect();

        log_success(format!(
            "Import finished: {} imported, {} skipped, {} accounts created ({})",
            result.imported,
            result.skipped,
            result.accounts_created.len(),
            result.success_rate()
        ));

        Ok(result)
    }

    /// One row through the full stage sequence.
    async fn process_row(
        &self,
        row: &RawRow,
        mapping: &ColumnMapping,
        resolver: &mut AccountResolver<'a, L>,
    ) -> Result<(), RowErrorKind> {
        let normalized = normalize_row(row, mapping)?;
        let class = Classification::of(normalized.direction);

        let source_id = resolver
            .resolve(&normalized.source_account, class.source_type)
            .await
            .map_err(|e| RowErrorKind::account(AccountSide::Source, e))?;

        let destination_id = resolver
            .resolve(&normalized.destination_account, class.destination_type)
            .await
            .map_err(|e| RowErrorKind::account(AccountSide::Destination, e))?;

        let payload = build_payload(&normalized, &source_id, &destination_id, &self.currency);

        self.client
            .post_transaction(&payload)
            .await
            .map_err(RowErrorKind::post)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::ledger::testing::MockLedger;
    use crate::models::AccountType;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            date: Some("Date".into()),
            amount: Some("Amount".into()),
            description: Some("Description".into()),
            source_account: Some("Source".into()),
            destination_account: Some("Destination".into()),
            transaction_type: Some("Type".into()),
            ..Default::default()
        }
    }

    fn row(date: &str, amount: &str, description: &str, source: &str, dest: &str) -> RawRow {
        [
            ("Date", date),
            ("Amount", amount),
            ("Description", description),
            ("Source", source),
            ("Destination", dest),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[tokio::test]
    async fn test_missing_mapping_field_rejected_before_rows() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let mut broken = mapping();
        broken.destination_account = None;

        let rows = vec![row("2024-03-15", "10.00", "x", "A", "B")];
        let err = importer.run(&rows, &broken).await.unwrap_err();

        assert!(err.to_string().contains("destination_account"));
        assert_eq!(ledger.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let result = importer.run(&[], &mapping()).await.unwrap();

        assert_eq!(result.imported, 0);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.success_rate(), "0%");
        assert_eq!(ledger.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_with_shared_and_existing_accounts() {
        let ledger = MockLedger::new();
        ledger.seed_account("Checking", AccountType::Asset);

        let importer = Importer::new(&ledger, "USD");
        let rows = vec![
            row("2024-03-15", "-12.00", "Bread", "Checking", "Groceries"),
            row("2024-03-16", "-7.50", "Milk", "Checking", "Groceries"),
            row("2024-03-17", "-30.00", "Cheese", "Checking", "Groceries"),
        ];

        let result = importer.run(&rows, &mapping()).await.unwrap();

        assert_eq!(result.imported, 3);
        assert_eq!(result.skipped, 0);
        // "Checking" pre-existed; only "Groceries" was created, once.
        assert_eq!(result.accounts_created, vec!["Groceries".to_string()]);
        assert_eq!(ledger.create_calls().len(), 1);
        assert_eq!(ledger.posted().len(), 3);
    }

    #[tokio::test]
    async fn test_shared_account_resolves_to_same_id() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let rows = vec![
            row("2024-03-15", "-1.00", "a", "Checking", "Rent"),
            row("2024-03-16", "-2.00", "b", "checking", "Rent"),
        ];

        let result = importer.run(&rows, &mapping()).await.unwrap();
        assert_eq!(result.imported, 2);

        let posted = ledger.posted();
        assert_eq!(
            posted[0].transactions[0].source_id,
            posted[1].transactions[0].source_id
        );
    }

    #[tokio::test]
    async fn test_invalid_row_skipped_without_remote_calls() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let rows = vec![row("2024-03-15", "0.00", "zero", "A", "B")];
        let result = importer.run(&rows, &mapping()).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].code, "zero_amount");
        assert_eq!(ledger.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_row_skipped_without_remote_calls() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let mut incomplete = row("2024-03-15", "-5.00", "x", "Checking", "Rent");
        incomplete.remove("Source");

        let result = importer.run(&[incomplete], &mapping()).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].code, "missing_required_field");
        assert_eq!(ledger.remote_calls(), 0);
    }

    #[tokio::test]
    async fn test_row_failure_does_not_abort_run() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let rows = vec![
            row("2024-03-15", "-5.00", "ok", "Checking", "Rent"),
            row("15-15-2024", "-5.00", "bad date", "Checking", "Rent"),
            row("2024-03-17", "-5.00", "ok too", "Checking", "Rent"),
        ];

        let result = importer.run(&rows, &mapping()).await.unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].code, "invalid_date");
    }

    #[tokio::test]
    async fn test_account_failure_skips_row_with_remote_message() {
        let mut ledger = MockLedger::new();
        ledger.fail_create = Some(RemoteError::status(422, "name: already taken"));

        let importer = Importer::new(&ledger, "USD");
        let rows = vec![row("2024-03-15", "-5.00", "x", "Checking", "Rent")];

        let result = importer.run(&rows, &mapping()).await.unwrap();

        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].code, "account_error");
        assert!(result.errors[0].reason.contains("Source account error"));
        assert!(result.errors[0].reason.contains("already taken"));
    }

    #[tokio::test]
    async fn test_post_failure_skips_row() {
        let mut ledger = MockLedger::new();
        ledger.fail_post = Some(RemoteError::status(422, "description: too long"));

        let importer = Importer::new(&ledger, "USD");
        let rows = vec![row("2024-03-15", "-5.00", "x", "Checking", "Rent")];

        let result = importer.run(&rows, &mapping()).await.unwrap();

        assert_eq!(result.imported, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors[0].code, "post_error");
        assert!(result.errors[0].reason.contains("too long"));
    }

    #[tokio::test]
    async fn test_transport_failure_recovered_as_processing_error() {
        let mut ledger = MockLedger::new();
        ledger.fail_post = Some(RemoteError::transport("connection reset"));

        let importer = Importer::new(&ledger, "USD");
        let rows = vec![
            row("2024-03-15", "-5.00", "x", "Checking", "Rent"),
            row("2024-03-16", "-6.00", "y", "Checking", "Rent"),
        ];

        let result = importer.run(&rows, &mapping()).await.unwrap();

        // Both rows fail at post, but the run itself completes.
        assert_eq!(result.skipped, 2);
        assert_eq!(result.errors[0].code, "processing_error");
    }

    #[tokio::test]
    async fn test_deposit_row_uses_revenue_source() {
        let ledger = MockLedger::new();
        let importer = Importer::new(&ledger, "USD");

        let mut deposit = row("2024-03-15", "1500.00", "Salary", "Employer", "Checking");
        deposit.insert("Type".into(), "income".into());

        let result = importer.run(&[deposit], &mapping()).await.unwrap();
        assert_eq!(result.imported, 1);

        let creates = ledger.create_calls();
        assert!(creates.contains(&("Employer".to_string(), AccountType::Revenue)));
        assert!(creates.contains(&("Checking".to_string(), AccountType::Asset)));
    }
}
