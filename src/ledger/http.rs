//! HTTP implementation of the ledger capability.
//!
//! Wraps every call in a retry loop: up to 3 attempts with exponential
//! backoff, retried only on transport failures and HTTP 500/502/504. Other
//! statuses fail immediately with a message parsed from the response body,
//! so remote validation errors surface verbatim in row error records.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ImportConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::import::builder::TransactionPayload;
use crate::ledger::{AccountSummary, LedgerService};
use crate::models::AccountType;

/// Maximum attempts per request.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay before a retry; doubles per attempt.
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Authenticated client for the remote ledger service's v1 API.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpLedgerClient {
    pub fn new(config: &ImportConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1{}", self.base_url, endpoint)
    }

    /// Check the service is reachable and the token is accepted.
    pub async fn test_connection(&self) -> RemoteResult<()> {
        self.request(Method::GET, "/about", None, None).await.map(|_| ())
    }

    /// Send one API request with the retry policy applied.
    ///
    /// Returns the parsed JSON body (`Null` for empty 2xx responses).
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> RemoteResult<Value> {
        let url = self.url(endpoint);
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let mut req = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.token)
                .header(header::ACCEPT, "application/json");
            if let Some(query) = query {
                req = req.query(query);
            }
            if let Some(body) = body {
                req = req.json(body);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    let text = response
                        .text()
                        .await
                        .map_err(|e| RemoteError::transport(e.to_string()))?;

                    if status.is_success() {
                        if text.trim().is_empty() {
                            return Ok(Value::Null);
                        }
                        return serde_json::from_str(&text).map_err(|e| {
                            RemoteError::transport(format!("Invalid JSON response: {e}"))
                        });
                    }

                    let err =
                        RemoteError::status(status.as_u16(), parse_error_body(status.as_u16(), &text));
                    if !is_retryable(status) {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
                Err(e) => {
                    last_error = Some(RemoteError::transport(e.to_string()));
                }
            }

            if attempt < MAX_ATTEMPTS {
                let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| RemoteError::transport("Request failed")))
    }
}

/// Only server-side transient statuses are worth retrying.
fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 504)
}

/// Extract a useful message from a non-2xx response body.
///
/// The service reports validation failures as an `errors` map of field to
/// message list; those are joined into one line. Falls back to `message`,
/// then `exception`, then a truncated raw body.
fn parse_error_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(|e| e.as_object()) {
            let joined = errors
                .iter()
                .map(|(field, messages)| {
                    let text = match messages {
                        Value::Array(list) => list
                            .iter()
                            .filter_map(|m| m.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    format!("{field}: {text}")
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(exception) = value.get("exception").and_then(|m| m.as_str()) {
            return exception.to_string();
        }
    }

    let snippet: String = body.chars().take(200).collect();
    if snippet.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {snippet}")
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AccountsEnvelope {
    #[serde(default)]
    data: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: Value,
    attributes: AccountAttributes,
}

#[derive(Debug, Deserialize)]
struct AccountAttributes {
    name: String,
}

/// Ids arrive as strings from the service, but tolerate numbers too.
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// LedgerService Implementation
// =============================================================================

impl LedgerService for HttpLedgerClient {
    async fn list_accounts(&self, kind: AccountType) -> RemoteResult<Vec<AccountSummary>> {
        let value = self
            .request(
                Method::GET,
                "/accounts",
                Some(&[("type", kind.as_str())]),
                None,
            )
            .await?;

        let envelope: AccountsEnvelope = serde_json::from_value(value)
            .map_err(|e| RemoteError::transport(format!("Unexpected accounts response: {e}")))?;

        Ok(envelope
            .data
            .into_iter()
            .map(|record| AccountSummary {
                id: id_to_string(&record.id),
                name: record.attributes.name,
            })
            .collect())
    }

    async fn create_account(
        &self,
        name: &str,
        kind: AccountType,
        currency: &str,
    ) -> RemoteResult<String> {
        let body = json!({
            "name": name,
            "type": kind.as_str(),
            "currency_code": currency,
            "active": true,
        });

        let value = self.request(Method::POST, "/accounts", None, Some(&body)).await?;

        value
            .pointer("/data/id")
            .map(id_to_string)
            .ok_or_else(|| RemoteError::transport("Create response missing account id"))
    }

    async fn post_transaction(&self, payload: &TransactionPayload) -> RemoteResult<String> {
        let body = serde_json::to_value(payload)
            .map_err(|e| RemoteError::transport(format!("Failed to encode payload: {e}")))?;

        let value = self
            .request(Method::POST, "/transactions", None, Some(&body))
            .await?;

        // The service returns the created group as an object, but some
        // versions wrap it in a one-element array.
        value
            .pointer("/data/id")
            .or_else(|| value.pointer("/data/0/id"))
            .map(id_to_string)
            .ok_or_else(|| RemoteError::transport("Post response missing transaction id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpLedgerClient {
        let config = ImportConfig::new("http://ledger.local:8080/", "secret", "USD");
        HttpLedgerClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joins_api_prefix() {
        let client = client();
        assert_eq!(
            client.url("/accounts"),
            "http://ledger.local:8080/api/v1/accounts"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [500u16, 502, 504] {
            assert!(is_retryable(StatusCode::from_u16(code).unwrap()));
        }
        for code in [400u16, 404, 422, 503] {
            assert!(!is_retryable(StatusCode::from_u16(code).unwrap()));
        }
    }

    #[test]
    fn test_parse_error_body_validation_map() {
        let body = r#"{"errors": {"name": ["may not be empty", "too short"]}}"#;
        let msg = parse_error_body(422, body);
        assert_eq!(msg, "name: may not be empty, too short");
    }

    #[test]
    fn test_parse_error_body_message_field() {
        let body = r#"{"message": "Unauthenticated."}"#;
        assert_eq!(parse_error_body(401, body), "Unauthenticated.");
    }

    #[test]
    fn test_parse_error_body_fallback() {
        assert_eq!(parse_error_body(500, ""), "HTTP 500");
        assert_eq!(
            parse_error_body(500, "<html>oops</html>"),
            "HTTP 500: <html>oops</html>"
        );
    }

    #[test]
    fn test_id_to_string_accepts_numbers() {
        assert_eq!(id_to_string(&json!("42")), "42");
        assert_eq!(id_to_string(&json!(42)), "42");
    }
}
