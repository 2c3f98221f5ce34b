//! Thin blocking client for the lesson backend.
//!
//! Calls are made from worker threads only; the runtime thread never waits on
//! the network.

use crate::config::PlayerConfig;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &PlayerConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.auth_token.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.authorize(self.client.get(&url)).send()?;
        decode(response, &url)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.authorize(self.client.post(&url).json(body)).send()?;
        decode(response, &url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text()?;
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(
            backend_message(&body).unwrap_or_else(|| url.to_string()),
        ));
    }
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: backend_message(&body).unwrap_or_else(|| status.to_string()),
        });
    }
    serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Backend errors carry a `{ "message": ... }` body.
pub(crate) fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_without_double_slashes() {
        let mut config = PlayerConfig::default();
        config.api_base_url = "http://localhost:8081/api/v1/".to_string();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url("/lessons/abc"),
            "http://localhost:8081/api/v1/lessons/abc"
        );
    }

    #[test]
    fn extracts_backend_message() {
        assert_eq!(
            backend_message(r#"{"message":"Failed to save progress"}"#).as_deref(),
            Some("Failed to save progress")
        );
        assert_eq!(backend_message("<html>"), None);
    }
}
