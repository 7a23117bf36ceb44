use clap::Parser;

use keepwarm_common::telemetry::LogFormat;
use keepwarm_traffic::config::{DEFAULT_INTERVAL_SECS, DEFAULT_MAX_TOKENS, DEFAULT_NAMESPACE};

#[derive(Debug, Parser)]
#[command(name = "keepwarm")]
#[command(about = "Keep model-serving endpoints warm with periodic synthetic requests", long_about = None)]
#[command(after_help = "Examples:
  # Run continuously with default settings
  keepwarm --token $CDP_TOKEN --domain ml.example.com

  # Run once and exit
  keepwarm --token $CDP_TOKEN --domain ml.example.com --once

  # Custom interval and namespace
  keepwarm --domain ml.example.com --interval 120 --namespace custom-ns")]
pub struct Args {
    /// Bearer token for the serving control plane and the endpoints
    #[arg(long, env = "CDP_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Serving domain, with or without scheme (e.g. ml.example.com)
    #[arg(long, env = "CML_DOMAIN")]
    pub domain: String,

    /// Namespace to keep warm
    #[arg(long, env = "KEEPWARM_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Seconds between traffic generation cycles
    #[arg(long, env = "KEEPWARM_INTERVAL_SECS", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Maximum tokens for text generation and VLM requests
    #[arg(long, env = "KEEPWARM_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Disable TLS certificate verification
    #[arg(long, default_value_t = false)]
    pub no_verify_ssl: bool,

    /// Run a single cycle and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Log output format: text or json
    #[arg(long, env = "KEEPWARM_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// OTLP endpoint for exporting traces (e.g. "http://collector:4318").
    #[arg(long, env = "KEEPWARM_OTLP_URL")]
    pub otlp_url: Option<String>,

    /// Bearer token for the OTLP collector.
    #[arg(long, env = "KEEPWARM_OTLP_TOKEN", hide_env_values = true)]
    pub otlp_token: Option<String>,
}
