//! Run configuration for the importer.
//!
//! Loaded once (from the environment or explicitly) and passed into the
//! client and orchestrator at construction time; nothing reads ambient
//! state after startup.

use std::env;

use crate::error::{ConfigError, ConfigResult};

/// Everything one import run needs to know about its ledger service.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Base URL of the ledger service, without trailing slash.
    pub base_url: String,
    /// Personal access token for bearer authentication.
    pub token: String,
    /// Currency assigned to created accounts and posted transactions.
    pub default_currency: String,
}

impl ImportConfig {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            default_currency: default_currency.into(),
        }
    }

    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// `LEDGER_BASE_URL` and `LEDGER_TOKEN` are required;
    /// `DEFAULT_CURRENCY` defaults to `USD`.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let base_url =
            env::var("LEDGER_BASE_URL").map_err(|_| ConfigError::MissingVar("LEDGER_BASE_URL"))?;
        if base_url.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                name: "LEDGER_BASE_URL",
                message: "must not be empty".to_string(),
            });
        }

        let token = env::var("LEDGER_TOKEN").map_err(|_| ConfigError::MissingVar("LEDGER_TOKEN"))?;
        if token.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                name: "LEDGER_TOKEN",
                message: "must not be empty".to_string(),
            });
        }

        let currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "USD".to_string());

        Ok(Self::new(base_url, token, currency))
    }
}
