use serde::Serialize;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 30.0,
            refill_per_sec: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Body cap for the JSON surface. The proxy and upload routes are
    /// exempt; spreadsheets arrive there.
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    /// Timeout for the chat webhook. The calculation workflow call is
    /// deliberately unbounded; calculations can run for minutes.
    pub chat_timeout: Duration,
    pub workflow_url: String,
    pub chat_url: Option<String>,
    pub enable_rate_limit: bool,
    pub rate_limit_per_ip: RateLimitConfig,
    pub upstream_error_excerpt_max: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 256 * 1024,
            request_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(60),
            workflow_url: String::new(),
            chat_url: None,
            enable_rate_limit: false,
            rate_limit_per_ip: RateLimitConfig::default(),
            upstream_error_excerpt_max: 500,
        }
    }
}

pub fn validate_startup_config_contract(api: &ApiConfig) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("api body limit must be > 0".to_string());
    }
    if api.request_timeout.is_zero() || api.chat_timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if api.workflow_url.trim().is_empty() {
        return Err("VERDANT_WORKFLOW_URL is required".to_string());
    }
    if api.enable_rate_limit && api.rate_limit_per_ip.capacity < 1.0 {
        return Err("rate limit capacity must be >= 1".to_string());
    }
    if api.upstream_error_excerpt_max == 0 {
        return Err("upstream error excerpt limit must be > 0".to_string());
    }
    Ok(())
}
