use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{DirectoryError, DirectoryService, EndpointRecord};

/// In-memory directory. Namespaces without records list as empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    namespaces: HashMap<String, Vec<EndpointRecord>>,
    failure: Option<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, namespace: &str, record: EndpointRecord) {
        let mut inner = self.inner.write().await;
        inner
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(record);
    }

    pub async fn replace(&self, namespace: &str, records: Vec<EndpointRecord>) {
        let mut inner = self.inner.write().await;
        inner.namespaces.insert(namespace.to_string(), records);
    }

    /// Make every subsequent listing fail with a transport error until cleared with `None`.
    pub async fn set_failure(&self, message: Option<&str>) {
        let mut inner = self.inner.write().await;
        inner.failure = message.map(str::to_string);
    }
}

#[async_trait]
impl DirectoryService for MemoryDirectory {
    async fn list_endpoints(&self, namespace: &str) -> Result<Vec<EndpointRecord>, DirectoryError> {
        let inner = self.inner.read().await;
        if let Some(msg) = &inner.failure {
            return Err(DirectoryError::Transport(msg.clone()));
        }
        Ok(inner.namespaces.get(namespace).cloned().unwrap_or_default())
    }
}
