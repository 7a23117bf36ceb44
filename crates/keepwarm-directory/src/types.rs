use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use keepwarm_common::{EndpointDescriptor, EndpointState, TaskKind};

/// Raw endpoint record as returned by the directory service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointRecord {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub api_standard: String,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub has_chat_template: bool,
}

impl EndpointRecord {
    pub fn into_descriptor(self) -> EndpointDescriptor {
        EndpointDescriptor {
            state: EndpointState::parse(&self.state),
            task: TaskKind::parse(&self.task),
            name: self.name,
            namespace: self.namespace,
            url: self.url,
            api_standard: self.api_standard,
            model_name: self.model_name,
            has_chat_template: self.has_chat_template,
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Transport(String),

    #[error("directory returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed directory response: {0}")]
    Decode(String),
}

/// Source of endpoint records for a namespace.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// List every endpoint in `namespace`, in the order the service returns them.
    async fn list_endpoints(&self, namespace: &str) -> Result<Vec<EndpointRecord>, DirectoryError>;
}
