// Pi-hole REST client
//
// Every call is a single GET on the admin API with the operation as a bare
// query key and `auth=<token>` appended. No caching, no retries.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::error::AdBlockerError;
use super::types::{
    AdBlockerStatus, AdBlockerSummary, BlacklistOutcome, BlacklistResult, TopBlocked,
};
use crate::config::PiholeConfig;

pub struct PiholeClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PiholeClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// Build from the `[pihole]` section. Fails when URL or token is missing.
    pub fn from_config(config: &PiholeConfig) -> Result<Self> {
        let (url, token) = config
            .credentials()
            .map_err(|reason| anyhow::anyhow!(reason))?;
        Self::new(url, token, Duration::from_secs(config.timeout_seconds))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(&self, op: &str, params: &[(&str, String)]) -> Result<Value, AdBlockerError> {
        let url = format!("{}?{}", self.base_url, op);
        tracing::debug!("Pi-hole request: {} {:?}", op, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("auth", self.token.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AdBlockerError::status(status.as_u16(), &body));
        }

        let value: Value = serde_json::from_str(&body)?;
        match &value {
            Value::Array(items) if items.is_empty() => Err(AdBlockerError::Unauthorized),
            _ => Ok(value),
        }
    }

    pub async fn get_status(&self) -> AdBlockerStatus {
        match self.call("status", &[]).await {
            Ok(value) => match value.get("status").and_then(Value::as_str) {
                Some(status) => AdBlockerStatus::from_status_field(status),
                None => AdBlockerStatus::Error("response had no status field".to_string()),
            },
            Err(e) => {
                tracing::warn!("Pi-hole status failed: {}", e);
                AdBlockerStatus::Error(e.to_string())
            }
        }
    }

    pub async fn enable(&self) -> Result<(), AdBlockerError> {
        self.call("enable", &[]).await.map(|_| ())
    }

    /// Disable blocking, for `seconds` if given, otherwise until re-enabled.
    pub async fn disable(&self, seconds: Option<u64>) -> Result<(), AdBlockerError> {
        let params: Vec<(&str, String)> = seconds
            .map(|s| vec![("time", s.to_string())])
            .unwrap_or_default();
        self.call("disable", &params).await.map(|_| ())
    }

    pub async fn get_summary(&self) -> Result<AdBlockerSummary, AdBlockerError> {
        let value = self.call("summary", &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get_top_blocked_domains(&self) -> Result<TopBlocked, AdBlockerError> {
        let value = self.call("topDomainsBlocked", &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn add_to_blacklist(&self, domain: &str) -> BlacklistResult {
        self.blacklist("blacklist", domain, BlacklistOutcome::Added)
            .await
    }

    pub async fn remove_from_blacklist(&self, domain: &str) -> BlacklistResult {
        self.blacklist("blacklist_delete", domain, BlacklistOutcome::Removed)
            .await
    }

    async fn blacklist(&self, op: &str, domain: &str, success: BlacklistOutcome) -> BlacklistResult {
        let outcome = match self.call(op, &[("domain", domain.to_string())]).await {
            Ok(value) => match rejection_message(&value) {
                Some(message) => BlacklistOutcome::Failed(message),
                None => success,
            },
            Err(e) => {
                tracing::warn!("Pi-hole {} failed for {}: {}", op, domain, e);
                BlacklistOutcome::Failed(e.to_string())
            }
        };

        BlacklistResult {
            domain: domain.to_string(),
            outcome,
        }
    }
}

/// List endpoints answer `{"success": false, "message": "..."}` on refusal.
fn rejection_message(value: &Value) -> Option<String> {
    match value.get("success").and_then(Value::as_bool) {
        Some(false) => Some(
            value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request refused")
                .to_string(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(&json!({"success": false, "message": "Invalid domain"})),
            Some("Invalid domain".to_string())
        );
        assert_eq!(
            rejection_message(&json!({"success": false})),
            Some("request refused".to_string())
        );
        assert_eq!(rejection_message(&json!({"success": true})), None);
        assert_eq!(rejection_message(&json!({})), None);
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = PiholeConfig::default();
        let err = PiholeClient::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("no Pi-hole API URL or token"));

        let config = PiholeConfig {
            url: Some("http://pi.hole/admin/api.php".to_string()),
            token: Some("secret".to_string()),
            ..PiholeConfig::default()
        };
        let client = PiholeClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://pi.hole/admin/api.php");
    }
}
