use crate::config::Config;
use crate::errors::ClientError;
use crate::models::ChargeEntry;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::info;

/// Thin wrapper over the spreadsheet macro endpoint. Both calls report
/// success or failure; callers decide what to surface.
#[derive(Clone)]
pub struct ChargeClient {
    http: Client,
    endpoint: String,
}

impl ChargeClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint_url.clone(),
        })
    }

    pub async fn log_charge(&self, entry: &ChargeEntry) -> Result<(), ClientError> {
        // Plain-text body avoids the CORS preflight macro endpoints reject.
        let body = serde_json::to_string(entry)?;
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        info!(date = %entry.date, kwh = entry.kwh, cost = entry.cost, "charge logged");
        Ok(())
    }

    /// Returns the endpoint's aggregate for the range, untouched. Non-JSON
    /// bodies come back as a JSON string.
    pub async fn history(&self, start: &str, end: &str) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("start", start), ("end", end)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let text = response.text().await?;
        info!(start, end, bytes = text.len(), "history fetched");
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(serde_json::Value::String(text)),
        }
    }
}
