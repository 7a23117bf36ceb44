use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use thiserror::Error;

use keepwarm_common::{EndpointDescriptor, TaskKind};

use crate::builders::{embedding, rerank, text, vision};
use crate::request::TrafficRequest;
use crate::transport::{Transport, TransportError, TransportResponse};

const RESPONSE_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The endpoint answered and the answer passed validation.
    Delivered { detail: Option<String> },
    /// The task has no synthetic request format; nothing was sent.
    Skipped { reason: &'static str },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty response: {0}")]
    EmptyResponse(&'static str),

    #[error("cannot derive request target from url '{0}'")]
    InvalidUrl(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unknown task type '{0}'")]
    UnknownTask(String),
}

impl DispatchError {
    fn status(resp: TransportResponse) -> Self {
        DispatchError::Status {
            status: resp.status,
            body: resp.text,
        }
    }
}

/// Collapse a dispatch result to "did the endpoint get handled".
pub fn is_success(result: &Result<DispatchOutcome, DispatchError>) -> bool {
    result.is_ok()
}

/// Picks the request shape for an endpoint's task, sends it, and validates the answer.
pub struct Dispatcher<T> {
    transport: T,
    rng: StdRng,
    max_tokens: u32,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, max_tokens: u32) -> Self {
        Self {
            transport,
            rng: StdRng::from_entropy(),
            max_tokens,
        }
    }

    /// Deterministic sampling, for tests and reproducible runs.
    pub fn with_seed(transport: T, max_tokens: u32, seed: u64) -> Self {
        Self {
            transport,
            rng: StdRng::seed_from_u64(seed),
            max_tokens,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn dispatch(
        &mut self,
        endpoint: &EndpointDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        tracing::info!(endpoint = %endpoint.name, task = %endpoint.task, "generating traffic");

        match &endpoint.task {
            TaskKind::TextGeneration => self.text_generation(endpoint).await,
            TaskKind::Embed => self.embedding(endpoint).await,
            TaskKind::Rank => self.rerank(endpoint).await,
            TaskKind::ImageTextToText | TaskKind::ObjectDetection => self.vision(endpoint).await,
            TaskKind::SpeechToText => Ok(skip(endpoint, "requires audio input")),
            TaskKind::TextToSpeech => Ok(skip(endpoint, "requires specific setup")),
            TaskKind::Inference => Ok(skip(endpoint, "generic inference format")),
            TaskKind::Unknown(raw) => Err(DispatchError::UnknownTask(raw.clone())),
        }
    }

    async fn send(
        &self,
        endpoint: &EndpointDescriptor,
        request: &TrafficRequest,
    ) -> Result<TransportResponse, DispatchError> {
        let url = request
            .target
            .resolve(&endpoint.url)
            .ok_or_else(|| DispatchError::InvalidUrl(endpoint.url.clone()))?;
        let body = request.body()?;
        tracing::debug!(endpoint = %endpoint.name, %url, "sending request");
        Ok(self.transport.post_json(&url, &body).await?)
    }

    async fn text_generation(
        &mut self,
        endpoint: &EndpointDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = text::build(endpoint, self.max_tokens, &mut self.rng);
        let resp = self.send(endpoint, &request).await?;
        if !resp.is_success() {
            return Err(DispatchError::status(resp));
        }

        let body = parse_json(&resp)?;
        check_choices(&body)?;
        log_preview(endpoint, &body);

        let kind = if endpoint.has_chat_template {
            "chat completion"
        } else {
            "completion"
        };
        tracing::info!(endpoint = %endpoint.name, "✓ {kind} successful");
        Ok(DispatchOutcome::Delivered {
            detail: Some(kind.to_string()),
        })
    }

    async fn embedding(
        &mut self,
        endpoint: &EndpointDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = embedding::build(endpoint, &mut self.rng);
        let resp = self.send(endpoint, &request).await?;
        if resp.status != 200 {
            return Err(DispatchError::status(resp));
        }

        let body = parse_json(&resp)?;
        let mut detail = None;
        if let Some(data) = body.get("data") {
            let first = data
                .as_array()
                .and_then(|d| d.first())
                .ok_or(DispatchError::EmptyResponse("embedding data is empty"))?;
            let dim = first
                .get("embedding")
                .and_then(|e| e.as_array())
                .map(|e| e.len())
                .ok_or_else(|| {
                    DispatchError::MalformedResponse("data[0] has no embedding array".to_string())
                })?;
            detail = Some(format!("dim: {dim}"));
        }

        match &detail {
            Some(d) => tracing::info!(endpoint = %endpoint.name, "✓ embedding successful ({d})"),
            None => tracing::info!(endpoint = %endpoint.name, "✓ embedding successful"),
        }
        Ok(DispatchOutcome::Delivered { detail })
    }

    /// Passage-style body first; on any non-200 answer, exactly one retry with the
    /// document-style body. A transport error on the first attempt ends the dispatch.
    async fn rerank(
        &mut self,
        endpoint: &EndpointDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        let requests = rerank::build(endpoint, &mut self.rng);

        let resp = self.send(endpoint, &requests.primary).await?;
        if resp.status == 200 {
            tracing::info!(endpoint = %endpoint.name, "✓ reranking successful");
            return Ok(DispatchOutcome::Delivered { detail: None });
        }
        tracing::debug!(
            endpoint = %endpoint.name,
            status = resp.status,
            "passage format rejected, trying document format"
        );

        let resp = self.send(endpoint, &requests.fallback).await?;
        if resp.status == 200 {
            tracing::info!(endpoint = %endpoint.name, "✓ reranking successful (alt format)");
            return Ok(DispatchOutcome::Delivered {
                detail: Some("alt format".to_string()),
            });
        }
        Err(DispatchError::status(resp))
    }

    async fn vision(
        &mut self,
        endpoint: &EndpointDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = vision::build(endpoint, self.max_tokens, &mut self.rng);
        let resp = self.send(endpoint, &request).await?;
        if !resp.is_success() {
            return Err(DispatchError::status(resp));
        }

        if let Ok(body) = resp.json() {
            log_preview(endpoint, &body);
        }
        tracing::info!(endpoint = %endpoint.name, "✓ VLM completion successful");
        Ok(DispatchOutcome::Delivered { detail: None })
    }
}

fn skip(endpoint: &EndpointDescriptor, reason: &'static str) -> DispatchOutcome {
    tracing::info!(endpoint = %endpoint.name, task = %endpoint.task, reason, "skipping endpoint");
    DispatchOutcome::Skipped { reason }
}

fn parse_json(resp: &TransportResponse) -> Result<Value, DispatchError> {
    resp.json()
        .map_err(|e| DispatchError::MalformedResponse(e.to_string()))
}

/// A `choices` field, when present, must hold at least one choice.
fn check_choices(body: &Value) -> Result<(), DispatchError> {
    match body.get("choices") {
        None => Ok(()),
        Some(choices) => match choices.as_array() {
            Some(c) if !c.is_empty() => Ok(()),
            _ => Err(DispatchError::EmptyResponse("no choices returned")),
        },
    }
}

fn log_preview(endpoint: &EndpointDescriptor, body: &Value) {
    let first = body.get("choices").and_then(|c| c.get(0));
    let content = first
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .or_else(|| first.and_then(|c| c.get("text")).and_then(|t| t.as_str()));
    if let Some(content) = content.filter(|c| !c.is_empty()) {
        let preview: String = content.chars().take(RESPONSE_PREVIEW_CHARS).collect();
        tracing::debug!(endpoint = %endpoint.name, "response: {preview}...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::endpoint;
    use crate::transport::testing::RecordingTransport;
    use keepwarm_common::EndpointState;
    use serde_json::json;

    fn dispatcher(transport: RecordingTransport) -> Dispatcher<RecordingTransport> {
        Dispatcher::with_seed(transport, 50, 11)
    }

    fn embed_endpoint() -> EndpointDescriptor {
        EndpointDescriptor {
            name: "embedder".to_string(),
            namespace: "serving-default".to_string(),
            url: "https://ml.example.com/namespaces/serving-default/endpoints/embedder/v1/embeddings"
                .to_string(),
            state: EndpointState::parse("Running"),
            api_standard: "openai".to_string(),
            task: TaskKind::Embed,
            model_name: "embed-1".to_string(),
            has_chat_template: false,
        }
    }

    fn rank_endpoint() -> EndpointDescriptor {
        EndpointDescriptor {
            task: TaskKind::Rank,
            url: "https://ml.example.com/ep/v1/ranking".to_string(),
            model_name: "rerank-qa".to_string(),
            ..embed_endpoint()
        }
    }

    #[tokio::test]
    async fn test_embedding_posts_to_endpoint_url() {
        let transport = RecordingTransport::new()
            .respond(200, json!({"data": [{"embedding": [0.1, 0.2, 0.3]}]}));
        let mut d = dispatcher(transport);
        let ep = embed_endpoint();

        let result = d.dispatch(&ep).await;
        assert_eq!(
            result.unwrap(),
            DispatchOutcome::Delivered {
                detail: Some("dim: 3".to_string())
            }
        );

        let calls = d.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ep.url);
        assert_eq!(calls[0].1["model"], "embed-1");
        assert_eq!(calls[0].1["input_type"], "query");
    }

    #[tokio::test]
    async fn test_embedding_requires_200() {
        let transport = RecordingTransport::new().respond(201, json!({"data": [{}]}));
        let mut d = dispatcher(transport);
        assert!(matches!(
            d.dispatch(&embed_endpoint()).await,
            Err(DispatchError::Status { status: 201, .. })
        ));
    }

    #[tokio::test]
    async fn test_embedding_empty_data_fails() {
        let transport = RecordingTransport::new().respond(200, json!({"data": []}));
        let mut d = dispatcher(transport);
        assert!(matches!(
            d.dispatch(&embed_endpoint()).await,
            Err(DispatchError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_item_without_vector_fails() {
        let transport = RecordingTransport::new()
            .respond(200, json!({"data": [{"object": "embedding", "index": 0}]}));
        let mut d = dispatcher(transport);
        assert!(matches!(
            d.dispatch(&embed_endpoint()).await,
            Err(DispatchError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_without_data_field_succeeds() {
        let transport = RecordingTransport::new().respond(200, json!({"object": "list"}));
        let mut d = dispatcher(transport);
        assert_eq!(
            d.dispatch(&embed_endpoint()).await.unwrap(),
            DispatchOutcome::Delivered { detail: None }
        );
    }

    #[tokio::test]
    async fn test_embedding_malformed_body_fails() {
        let transport = RecordingTransport::new().respond_text(200, "<html>");
        let mut d = dispatcher(transport);
        assert!(matches!(
            d.dispatch(&embed_endpoint()).await,
            Err(DispatchError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_rerank_primary_success_sends_once() {
        let transport = RecordingTransport::new().respond(200, json!({"rankings": []}));
        let mut d = dispatcher(transport);
        let ep = rank_endpoint();
        assert!(is_success(&d.dispatch(&ep).await));

        let calls = d.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ep.url);
        assert!(calls[0].1.get("passages").is_some());
    }

    #[tokio::test]
    async fn test_rerank_falls_back_once_on_rejection() {
        let transport = RecordingTransport::new()
            .respond(422, json!({"detail": "field required: documents"}))
            .respond(200, json!({"results": []}));
        let mut d = dispatcher(transport);
        let ep = rank_endpoint();

        assert_eq!(
            d.dispatch(&ep).await.unwrap(),
            DispatchOutcome::Delivered {
                detail: Some("alt format".to_string())
            }
        );
        let calls = d.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, ep.url);
        assert!(calls[1].1.get("documents").is_some());
        assert_eq!(calls[1].1["query"], calls[0].1["query"]["text"]);
    }

    #[tokio::test]
    async fn test_rerank_both_formats_rejected() {
        let transport = RecordingTransport::new()
            .respond(400, json!({}))
            .respond(500, json!({}));
        let mut d = dispatcher(transport);

        let result = d.dispatch(&rank_endpoint()).await;
        assert!(matches!(result, Err(DispatchError::Status { status: 500, .. })));
        assert_eq!(d.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_rerank_transport_error_skips_fallback() {
        let transport = RecordingTransport::new().fail(TransportError::Timeout);
        let mut d = dispatcher(transport);

        let result = d.dispatch(&rank_endpoint()).await;
        assert!(matches!(
            result,
            Err(DispatchError::Transport(TransportError::Timeout))
        ));
        assert_eq!(d.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_goes_to_derived_base() {
        let transport = RecordingTransport::new().respond(
            200,
            json!({"choices": [{"message": {"role": "assistant", "content": "Hi!"}}]}),
        );
        let mut d = dispatcher(transport);
        let ep = endpoint(TaskKind::TextGeneration, "llama", true);

        assert!(is_success(&d.dispatch(&ep).await));
        let calls = d.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "https://ml.example.com/namespaces/serving-default/endpoints/llama-ep/v1/chat/completions"
        );
        assert_eq!(calls[0].1["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_completion_goes_to_completions_path() {
        let transport =
            RecordingTransport::new().respond(200, json!({"choices": [{"text": "ML is..."}]}));
        let mut d = dispatcher(transport);
        let ep = EndpointDescriptor {
            url: "https://ml.example.com/ep/gpt2/v1/completions".to_string(),
            ..endpoint(TaskKind::TextGeneration, "gpt2", false)
        };

        assert!(is_success(&d.dispatch(&ep).await));
        let calls = d.transport().calls();
        assert_eq!(calls[0].0, "https://ml.example.com/ep/gpt2/completions");
        assert!(calls[0].1["prompt"].is_string());
    }

    #[tokio::test]
    async fn test_text_empty_choices_fails() {
        let transport = RecordingTransport::new().respond(200, json!({"choices": []}));
        let mut d = dispatcher(transport);
        let ep = endpoint(TaskKind::TextGeneration, "llama", true);
        assert!(matches!(
            d.dispatch(&ep).await,
            Err(DispatchError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_text_error_status_fails() {
        let transport = RecordingTransport::new().respond(503, json!({"error": "loading"}));
        let mut d = dispatcher(transport);
        let ep = endpoint(TaskKind::TextGeneration, "llama", true);
        assert!(!is_success(&d.dispatch(&ep).await));
    }

    #[tokio::test]
    async fn test_text_invalid_url_sends_nothing() {
        let mut d = dispatcher(RecordingTransport::new());
        let ep = EndpointDescriptor {
            url: "https://ml.example.com".to_string(),
            ..endpoint(TaskKind::TextGeneration, "llama", true)
        };
        assert!(matches!(
            d.dispatch(&ep).await,
            Err(DispatchError::InvalidUrl(_))
        ));
        assert!(d.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_object_detection_uses_vision_request() {
        let transport = RecordingTransport::new().respond_text(200, "ok");
        let mut d = dispatcher(transport);
        let ep = endpoint(TaskKind::ObjectDetection, "nemoretriever-parse", false);

        assert!(is_success(&d.dispatch(&ep).await));
        let calls = d.transport().calls();
        let content = calls[0].1["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "image_url");
    }

    #[tokio::test]
    async fn test_unsupported_tasks_are_skipped_without_requests() {
        let mut d = dispatcher(RecordingTransport::new());
        for task in [TaskKind::SpeechToText, TaskKind::TextToSpeech, TaskKind::Inference] {
            let result = d.dispatch(&endpoint(task, "whisper", false)).await;
            assert!(matches!(result, Ok(DispatchOutcome::Skipped { .. })));
        }
        assert!(d.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_task_fails_without_requests() {
        let mut d = dispatcher(RecordingTransport::new());
        let result = d
            .dispatch(&endpoint(TaskKind::parse("FOO"), "mystery", false))
            .await;
        assert!(matches!(result, Err(DispatchError::UnknownTask(ref t)) if t == "FOO"));
        assert!(!is_success(&result));
        assert!(d.transport().calls().is_empty());
    }
}
