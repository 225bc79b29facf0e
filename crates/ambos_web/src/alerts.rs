use reqwest::StatusCode;
use tracing::info;

use ambos_core::{Error, Result};

/// Delivers alert payloads to caller-supplied webhook endpoints.
#[derive(Clone, Default)]
pub struct AlertDispatcher {
    http: reqwest::Client,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// POST a JSON payload to the endpoint. Non-2xx responses are upstream
    /// errors; the payload is never retried here.
    pub async fn dispatch(&self, endpoint: &str, payload: &serde_json::Value) -> Result<StatusCode> {
        let response = self.http.post(endpoint).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "webhook endpoint returned {status}"
            )));
        }
        info!("🔔 alert delivered to {endpoint} ({status})");
        Ok(status)
    }
}
