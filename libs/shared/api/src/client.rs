use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::PortalConfig;
use shared_models::{ApiEnvelope, ApiError};

/// Thin wrapper around the portal REST API. One instance is shared across
/// every cell; the bearer token is passed per call because the session owns
/// its lifecycle.
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.api_base_url.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw request: returns the decoded body of a 2xx response, maps
    /// everything else onto the `ApiError` taxonomy. Non-2xx bodies that
    /// carry an envelope `message` surface that message verbatim.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4();
        debug!("[{}] {} {}", request_id, method, url);

        let mut req = self.client.request(method, &url);
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("[{}] API error ({}): {}", request_id, status, error_text);

            // Structured rejections wrap their reason in the envelope.
            let message = serde_json::from_str::<ApiEnvelope<Value>>(&error_text)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or(error_text);
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetch an enveloped payload and unwrap it.
    pub async fn fetch_data<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self.request(method, path, auth_token, body).await?;
        envelope.into_data()
    }

    /// Fire a mutation where only the acknowledgment matters.
    pub async fn fetch_ack(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(), ApiError> {
        let envelope: ApiEnvelope<Value> = self.request(method, path, auth_token, body).await?;
        envelope.into_ack()
    }
}

/// RFC 3339 timestamp, URL-encoded for use in a query string.
pub fn encode_query_ts(ts: &chrono::DateTime<chrono::Utc>) -> String {
    urlencoding::encode(&ts.to_rfc3339()).into_owned()
}
