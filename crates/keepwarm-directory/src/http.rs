use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::{DirectoryError, DirectoryService, EndpointRecord};

pub const DEFAULT_LIST_PATH: &str = "/api/v1alpha1/listEndpoints";

#[derive(Debug, Clone)]
pub struct HttpDirectoryConfig {
    /// Scheme and host of the serving control plane, e.g. `https://ml.example.com`.
    pub base_url: String,
    pub token: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
    pub list_path: String,
}

impl HttpDirectoryConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            verify_ssl: true,
            timeout: Duration::from_secs(30),
            list_path: DEFAULT_LIST_PATH.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListEndpointsResponse {
    #[serde(default)]
    endpoints: Vec<EndpointRecord>,
}

/// Directory client for the serving control plane's `listEndpoints` API.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl HttpDirectory {
    pub fn new(config: HttpDirectoryConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: list_url(&config.base_url, &config.list_path),
            token: config.token,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn list_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl DirectoryService for HttpDirectory {
    async fn list_endpoints(&self, namespace: &str) -> Result<Vec<EndpointRecord>, DirectoryError> {
        let body = serde_json::json!({ "namespace": namespace });
        tracing::debug!(url = %self.url, %namespace, "listing endpoints");

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_list_response(&text)
    }
}

fn parse_list_response(text: &str) -> Result<Vec<EndpointRecord>, DirectoryError> {
    serde_json::from_str::<ListEndpointsResponse>(text)
        .map(|r| r.endpoints)
        .map_err(|e| DirectoryError::Decode(e.to_string()))
}
