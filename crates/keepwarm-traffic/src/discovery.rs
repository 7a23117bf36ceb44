use keepwarm_common::EndpointDescriptor;
use keepwarm_directory::{DirectoryError, DirectoryService};

/// Turns directory listings into descriptors of endpoints that can take traffic.
pub struct Discovery<D> {
    directory: D,
}

impl<D: DirectoryService> Discovery<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Active endpoints of `namespace`, in service order.
    pub async fn try_discover(
        &self,
        namespace: &str,
    ) -> Result<Vec<EndpointDescriptor>, DirectoryError> {
        tracing::info!(%namespace, "discovering endpoints");
        let records = self.directory.list_endpoints(namespace).await?;

        let mut endpoints = Vec::with_capacity(records.len());
        for record in records {
            let desc = record.into_descriptor();
            if desc.is_active() {
                tracing::info!(
                    endpoint = %desc.name,
                    task = %desc.task,
                    state = %desc.state,
                    "found endpoint"
                );
                endpoints.push(desc);
            } else {
                tracing::debug!(endpoint = %desc.name, state = %desc.state, "skipping endpoint");
            }
        }

        tracing::info!(count = endpoints.len(), "discovered running endpoints");
        Ok(endpoints)
    }

    /// Like [`try_discover`](Self::try_discover), but a failed listing yields no endpoints.
    pub async fn discover(&self, namespace: &str) -> Vec<EndpointDescriptor> {
        match self.try_discover(namespace).await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                tracing::warn!(error = %e, %namespace, "failed to discover endpoints");
                Vec::new()
            }
        }
    }
}
