use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use keepwarm_directory::DirectoryService;

use crate::config::TrafficConfig;
use crate::discovery::Discovery;
use crate::dispatch::{DispatchError, Dispatcher};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

impl CycleOutcome {
    pub fn summary(&self) -> String {
        format!("{}/{}", self.succeeded, self.attempted)
    }
}

/// Discovers endpoints and sends one request to each, sequentially.
pub struct CycleRunner<D, T> {
    discovery: Discovery<D>,
    dispatcher: Dispatcher<T>,
    pacing: Duration,
    interval: Duration,
}

impl<D: DirectoryService, T: Transport> CycleRunner<D, T> {
    pub fn new(discovery: Discovery<D>, dispatcher: Dispatcher<T>, config: &TrafficConfig) -> Self {
        Self {
            discovery,
            dispatcher,
            pacing: config.pacing,
            interval: config.interval,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// One pass over the namespace. A cancelled `shutdown` stops the pass before
    /// the next endpoint and cuts the pacing pause short; an in-flight call is not
    /// interrupted.
    pub async fn run_once(&mut self, namespace: &str, shutdown: &CancellationToken) -> CycleOutcome {
        let span = tracing::info_span!("cycle", cycle_id = %uuid::Uuid::new_v4(), %namespace);
        self.run_cycle(namespace, shutdown).instrument(span).await
    }

    async fn run_cycle(&mut self, namespace: &str, shutdown: &CancellationToken) -> CycleOutcome {
        let endpoints = self.discovery.discover(namespace).await;
        let mut outcome = CycleOutcome::default();

        if endpoints.is_empty() {
            tracing::warn!("no running endpoints found");
            return outcome;
        }

        for endpoint in &endpoints {
            if shutdown.is_cancelled() {
                tracing::info!(
                    remaining = endpoints.len() - outcome.attempted,
                    "shutdown requested, stopping cycle early"
                );
                break;
            }
            outcome.attempted += 1;
            match self.dispatcher.dispatch(endpoint).await {
                Ok(_) => outcome.succeeded += 1,
                Err(DispatchError::UnknownTask(task)) => {
                    tracing::warn!(endpoint = %endpoint.name, %task, "unknown task type");
                }
                Err(e) => {
                    tracing::error!(
                        endpoint = %endpoint.name,
                        task = %endpoint.task,
                        error = %e,
                        "failed to generate traffic"
                    );
                }
            }
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(self.pacing) => {}
            }
        }

        tracing::info!(
            succeeded = outcome.succeeded,
            attempted = outcome.attempted,
            "cycle complete: {} successful",
            outcome.summary()
        );
        outcome
    }

    /// Run cycles every `interval` until `shutdown` is cancelled. Cancellation ends
    /// the current cycle at the next endpoint boundary and interrupts the interval sleep.
    pub async fn run_continuous(&mut self, namespace: &str, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            %namespace,
            "starting continuous traffic generation"
        );

        while !shutdown.is_cancelled() {
            let cycle = AssertUnwindSafe(self.run_once(namespace, &shutdown)).catch_unwind().await;
            match cycle {
                Ok(_) => {
                    tracing::info!(interval_secs = self.interval.as_secs(), "waiting before next cycle");
                }
                Err(panic) => {
                    tracing::error!(
                        error = %panic_message(panic.as_ref()),
                        "error in traffic generation cycle"
                    );
                    tracing::info!(interval_secs = self.interval.as_secs(), "waiting before retry");
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("traffic generation stopped");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
