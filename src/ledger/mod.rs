//! The remote ledger capability.
//!
//! [`LedgerService`] is the seam between the import pipeline and the system
//! of record: three calls, all idempotent from the pipeline's perspective
//! except account creation, whose at-most-once-per-key guarantee is owned by
//! the account resolver rather than the remote service.
//!
//! [`http::HttpLedgerClient`] is the production implementation; tests use the
//! in-memory mock in [`testing`].

pub mod http;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::import::builder::TransactionPayload;
use crate::models::AccountType;

/// A remote account as returned by listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
}

/// The three calls the pipeline makes against the system of record.
pub trait LedgerService {
    /// List accounts of the given type.
    fn list_accounts(
        &self,
        kind: AccountType,
    ) -> impl std::future::Future<Output = Result<Vec<AccountSummary>, RemoteError>> + Send;

    /// Create an account, returning its id.
    fn create_account(
        &self,
        name: &str,
        kind: AccountType,
        currency: &str,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;

    /// Post one transaction payload, returning the created transaction id.
    fn post_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory ledger that records every call.
    ///
    /// Accounts created through it become visible to later listings, like a
    /// real service. Failure injection flips individual calls to errors.
    pub struct MockLedger {
        state: Mutex<MockState>,
        pub fail_create: Option<RemoteError>,
        pub fail_post: Option<RemoteError>,
        pub fail_list: Option<RemoteError>,
    }

    struct MockState {
        accounts: HashMap<AccountType, Vec<AccountSummary>>,
        next_id: u64,
        list_calls: usize,
        create_calls: Vec<(String, AccountType)>,
        posted: Vec<TransactionPayload>,
    }

    impl MockLedger {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(MockState {
                    accounts: HashMap::new(),
                    next_id: 1,
                    list_calls: 0,
                    create_calls: Vec::new(),
                    posted: Vec::new(),
                }),
                fail_create: None,
                fail_post: None,
                fail_list: None,
            }
        }

        /// Pre-seed an existing account, returning its id.
        pub fn seed_account(&self, name: &str, kind: AccountType) -> String {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id.to_string();
            state.next_id += 1;
            state.accounts.entry(kind).or_default().push(AccountSummary {
                id: id.clone(),
                name: name.to_string(),
            });
            id
        }

        pub fn list_calls(&self) -> usize {
            self.state.lock().unwrap().list_calls
        }

        pub fn create_calls(&self) -> Vec<(String, AccountType)> {
            self.state.lock().unwrap().create_calls.clone()
        }

        pub fn posted(&self) -> Vec<TransactionPayload> {
            self.state.lock().unwrap().posted.clone()
        }

        pub fn remote_calls(&self) -> usize {
            let state = self.state.lock().unwrap();
            state.list_calls + state.create_calls.len() + state.posted.len()
        }
    }

    impl LedgerService for MockLedger {
        async fn list_accounts(
            &self,
            kind: AccountType,
        ) -> Result<Vec<AccountSummary>, RemoteError> {
            if let Some(err) = &self.fail_list {
                return Err(err.clone());
            }
            let mut state = self.state.lock().unwrap();
            state.list_calls += 1;
            Ok(state.accounts.get(&kind).cloned().unwrap_or_default())
        }

        async fn create_account(
            &self,
            name: &str,
            kind: AccountType,
            _currency: &str,
        ) -> Result<String, RemoteError> {
            if let Some(err) = &self.fail_create {
                return Err(err.clone());
            }
            let mut state = self.state.lock().unwrap();
            state.create_calls.push((name.to_string(), kind));
            let id = state.next_id.to_string();
            state.next_id += 1;
            state.accounts.entry(kind).or_default().push(AccountSummary {
                id: id.clone(),
                name: name.to_string(),
            });
            Ok(id)
        }

        async fn post_transaction(
            &self,
            payload: &TransactionPayload,
        ) -> Result<String, RemoteError> {
            if let Some(err) = &self.fail_post {
                return Err(err.clone());
            }
            let mut state = self.state.lock().unwrap();
            state.posted.push(payload.clone());
            let id = state.next_id.to_string();
            state.next_id += 1;
            Ok(id)
        }
    }
}
