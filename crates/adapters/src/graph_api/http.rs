//! Graph API adapter over HTTPS

use async_trait::async_trait;
use ig_poster_domain::{GraphApi, GraphError};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Graph API client using form POSTs and query-string GETs
///
/// TLS certificate and hostname verification use reqwest's defaults and are
/// never disabled.
pub struct HttpGraphApi {
    client: Client,
    base_url: String,
}

impl HttpGraphApi {
    pub const DEFAULT_BASE_URL: &'static str = "https://graph.facebook.com";

    pub fn new(timeout: Duration) -> Result<Self, GraphError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraphError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, GraphError> {
        let response = request
            .send()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        interpret_response(status, &body)
    }
}

/// Turn a status code and body into the parsed body or an API error
///
/// A response is an error when the status is 400 or above, or when the body
/// carries a non-null `error` object, whatever the status.
pub(crate) fn interpret_response(status: u16, body: &str) -> Result<Value, GraphError> {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let error = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .filter(|e| !e.is_null());

    if status >= 400 || error.is_some() {
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str);
        tracing::debug!(status, message = ?message, "Graph API returned an error");
        return Err(GraphError::api(message));
    }

    parsed.ok_or_else(|| {
        GraphError::UnexpectedResponse("Response body is not valid JSON".to_string())
    })
}

#[async_trait]
impl GraphApi for HttpGraphApi {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GraphError> {
        tracing::debug!(method = "GET", path = %path, "Graph API request");
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Value, GraphError> {
        tracing::debug!(method = "POST", path = %path, "Graph API request");
        let request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(fields);
        self.send(request).await
    }
}
