mod args;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use keepwarm_common::telemetry::init_tracing;
use keepwarm_directory::{HttpDirectory, HttpDirectoryConfig};
use keepwarm_traffic::{
    normalize_domain, CycleRunner, Discovery, Dispatcher, HttpTransport, HttpTransportConfig,
    TrafficConfig,
};

use crate::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let otel_guard = init_tracing(
        "keepwarm",
        args.debug,
        args.log_format,
        args.otlp_url.as_deref(),
        args.otlp_token.as_deref(),
    );

    let base_url = normalize_domain(&args.domain).context("--domain is empty")?;
    let verify_ssl = !args.no_verify_ssl;
    if !verify_ssl {
        tracing::warn!("TLS certificate verification disabled");
    }

    let mut directory_config = HttpDirectoryConfig::new(base_url.clone(), args.token.clone());
    directory_config.verify_ssl = verify_ssl;
    let directory = HttpDirectory::new(directory_config).context("failed to build directory client")?;

    let mut transport_config = HttpTransportConfig::new(args.token.clone());
    transport_config.verify_ssl = verify_ssl;
    let transport = HttpTransport::new(transport_config).context("failed to build http client")?;

    let config = TrafficConfig {
        namespace: args.namespace,
        interval: Duration::from_secs(args.interval),
        max_tokens: args.max_tokens,
        ..TrafficConfig::default()
    };

    tracing::info!(%base_url, namespace = %config.namespace, once = args.once, "keepwarm starting");

    let mut runner = CycleRunner::new(
        Discovery::new(directory),
        Dispatcher::new(transport, config.max_tokens),
        &config,
    );

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::info!("received interrupt signal, stopping after the current request");
        trigger.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt, exiting immediately");
            std::process::exit(130);
        }
    });

    if args.once {
        tracing::info!("running single traffic generation cycle");
        runner.run_once(&config.namespace, &shutdown).await;
    } else {
        runner.run_continuous(&config.namespace, shutdown).await;
    }

    if let Some(provider) = otel_guard {
        if let Err(e) = provider.shutdown() {
            eprintln!("failed to flush traces: {e}");
        }
    }
    Ok(())
}
