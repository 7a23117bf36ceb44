use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub text: String,
}

impl TransportResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.text)
    }
}

/// "Send JSON, get status and body" capability used by the dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub token: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
}

impl HttpTransportConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            verify_ssl: true,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// Bearer-authenticated JSON POSTs over one pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    token: String,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;
        Ok(Self {
            http,
            token: config.token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        Ok(TransportResponse { status, text })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Records every POST and answers from a scripted queue; `200 {}` once the queue is empty.
    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: Value) -> Self {
            self.push(Ok(TransportResponse::new(status, body.to_string())))
        }

        pub fn respond_text(self, status: u16, text: &str) -> Self {
            self.push(Ok(TransportResponse::new(status, text)))
        }

        pub fn fail(self, err: TransportError) -> Self {
            self.push(Err(err))
        }

        fn push(self, r: Result<TransportResponse, TransportError>) -> Self {
            if let Ok(mut q) = self.responses.lock() {
                q.push_back(r);
            }
            self
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post_json(
            &self,
            url: &str,
            body: &Value,
        ) -> Result<TransportResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TransportResponse::new(200, "{}")))
        }
    }
}
