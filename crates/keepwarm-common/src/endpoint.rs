use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::TaskKind;

/// Lifecycle state reported by the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointState {
    Running,
    Loaded,
    Other(String),
}

impl EndpointState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "running" => EndpointState::Running,
            "loaded" => EndpointState::Loaded,
            _ => EndpointState::Other(raw.to_string()),
        }
    }

    /// Only running and loaded endpoints admit traffic.
    pub fn is_active(&self) -> bool {
        matches!(self, EndpointState::Running | EndpointState::Loaded)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EndpointState::Running => "running",
            EndpointState::Loaded => "loaded",
            EndpointState::Other(raw) => raw,
        }
    }
}

impl From<String> for EndpointState {
    fn from(raw: String) -> Self {
        EndpointState::parse(&raw)
    }
}

impl From<EndpointState> for String {
    fn from(state: EndpointState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered endpoint. Built once per discovery cycle and only ever shared
/// by reference afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: String,
    pub namespace: String,

    /// Full request target; usually already carries a task path such as `/v1/embeddings`.
    pub url: String,
    pub state: EndpointState,

    /// Declared wire flavor (e.g. "openai"). Informational only; `task` drives dispatch.
    pub api_standard: String,
    pub task: TaskKind,
    pub model_name: String,
    pub has_chat_template: bool,
}

impl EndpointDescriptor {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
