use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "serving-default";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 50;
/// Pause between two endpoints of the same cycle.
pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct TrafficConfig {
    pub namespace: String,
    pub interval: Duration,
    pub max_tokens: u32,
    pub pacing: Duration,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            pacing: DEFAULT_PACING,
        }
    }
}

/// Normalize a serving domain to an `https://host[/path]` base URL.
///
/// Accepts the domain with or without an `http://`/`https://` scheme and with
/// trailing slashes. Returns `None` when nothing is left after stripping.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let domain = raw.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    let domain = domain.trim_end_matches('/');
    if domain.is_empty() {
        return None;
    }
    Some(format!("https://{domain}"))
}
