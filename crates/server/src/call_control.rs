//! Carrier call control
//!
//! Transfer and hangup are REST calls against the carrier's call-control
//! API. Without a configured API the operations are logged and succeed,
//! which is only accepted outside strict environments.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use voice_intake_config::TelephonyConfig;
use voice_intake_core::{CallControl, Error, Result};

use crate::ServerError;

const CALL_CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
}

/// Call control over the carrier REST API
pub struct HttpCallControl {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    transfer_number: Option<String>,
}

impl HttpCallControl {
    pub fn new(
        base_url: impl Into<String>,
        config: &TelephonyConfig,
    ) -> std::result::Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(CALL_CONTROL_TIMEOUT)
            .build()
            .map_err(|e| ServerError::CallControl(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            transfer_number: config.transfer_number.clone(),
        })
    }

    fn endpoint(&self, call_id: &str, action: &str) -> String {
        format!("{}/calls/{}/{}", self.base_url, call_id, action)
    }

    async fn post<T: Serialize + ?Sized>(&self, url: String, body: &T) -> Result<()> {
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Telephony(format!("{} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Telephony(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CallControl for HttpCallControl {
    async fn transfer_to_human(&self, call_id: &str) -> Result<()> {
        let body = TransferRequest {
            to: self.transfer_number.as_deref(),
        };
        self.post(self.endpoint(call_id, "transfer"), &body).await?;
        tracing::info!(call_id = %call_id, "Call transferred to human");
        Ok(())
    }

    async fn hangup(&self, call_id: &str) -> Result<()> {
        self.post(self.endpoint(call_id, "hangup"), &serde_json::json!({}))
            .await?;
        tracing::info!(call_id = %call_id, "Call hung up");
        Ok(())
    }
}

/// Stand-in when no call-control API is configured
#[derive(Debug, Default)]
pub struct LoggingCallControl;

#[async_trait]
impl CallControl for LoggingCallControl {
    async fn transfer_to_human(&self, call_id: &str) -> Result<()> {
        tracing::warn!(call_id = %call_id, "No call-control API configured, transfer not performed");
        Ok(())
    }

    async fn hangup(&self, call_id: &str) -> Result<()> {
        tracing::warn!(call_id = %call_id, "No call-control API configured, hangup not performed");
        Ok(())
    }
}
