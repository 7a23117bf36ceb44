use serde::Serialize;
use serde_json::Value;

/// Where a request goes, relative to the endpoint's advertised URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// POST to the endpoint URL unchanged.
    Direct,
    /// POST to `{base}/chat/completions`, where `base` is the endpoint URL minus its
    /// last two path segments.
    ChatCompletions,
    /// POST to `{base}/completions`.
    Completions,
}

impl Target {
    /// Resolve the request URL for an endpoint. `None` if the URL has too few path
    /// segments to derive a base from.
    pub fn resolve(&self, endpoint_url: &str) -> Option<String> {
        match self {
            Target::Direct => Some(endpoint_url.to_string()),
            Target::ChatCompletions => {
                strip_task_suffix(endpoint_url).map(|base| format!("{base}/chat/completions"))
            }
            Target::Completions => {
                strip_task_suffix(endpoint_url).map(|base| format!("{base}/completions"))
            }
        }
    }
}

/// Drop the last two path segments (e.g. `/v1/chat/completions` -> `/v1`).
fn strip_task_suffix(url: &str) -> Option<&str> {
    let mut end = url.len();
    for _ in 0..2 {
        end = url[..end].rfind('/')?;
    }
    let base = &url[..end];
    let host_start = base.find("://")? + 3;
    if base.len() <= host_start {
        return None;
    }
    Some(base)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: String,
    pub input_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextItem {
    pub text: String,
}

/// Passage-style rerank body: `{model, query: {text}, passages: [{text}]}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RerankRequest {
    pub model: String,
    pub query: TextItem,
    pub passages: Vec<TextItem>,
}

/// Document-style rerank body: `{model, query, documents: [..]}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RerankDocumentsRequest {
    pub model: String,
    pub query: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    Chat(ChatCompletionRequest),
    Completion(CompletionRequest),
    Embedding(EmbeddingRequest),
    Rerank(RerankRequest),
    RerankDocuments(RerankDocumentsRequest),
}

/// A fully built request, independent of the endpoint it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRequest {
    pub target: Target,
    pub payload: Payload,
}

impl TrafficRequest {
    pub fn body(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(&self.payload)
    }
}
