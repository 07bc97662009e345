#![forbid(unsafe_code)]

mod config;
mod http;
mod middleware;
mod rate_limiter;
mod upstream;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post, put};
use axum::Router;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use tokio::sync::Mutex;
use verdant_store::Store;

pub const CRATE_NAME: &str = "verdant-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{validate_startup_config_contract, ApiConfig, RateLimitConfig, CONFIG_SCHEMA_VERSION};
pub use upstream::{UpstreamClient, UpstreamResponse};

#[derive(Debug, Default)]
pub struct RequestMetrics {
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
    pub uploads_total: AtomicU64,
    pub upload_failures_total: AtomicU64,
    pub proxy_requests_total: AtomicU64,
    pub chat_requests_total: AtomicU64,
    pub rate_limited_total: AtomicU64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub api: ApiConfig,
    pub upstream: Arc<UpstreamClient>,
    pub ready: Arc<AtomicBool>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
    pub(crate) upload_limiter: Arc<rate_limiter::RateLimiter>,
}

impl AppState {
    #[must_use]
    pub fn with_config(store: Store, api: ApiConfig) -> Self {
        let upstream = Arc::new(UpstreamClient::new(&api));
        Self {
            store: Arc::new(Mutex::new(store)),
            api,
            upstream,
            ready: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            upload_limiter: Arc::new(rate_limiter::RateLimiter::default()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // The calculation proxy and the upload route must accept arbitrarily
    // large multipart bodies; everything else stays behind the body cap.
    let passthrough = Router::new()
        .route("/calculate-emissions", any(http::proxy::proxy_handler))
        .route("/v1/uploads", post(http::uploads::upload_handler))
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/v1/openapi.json", get(http::handlers::openapi_handler))
        .route(
            "/v1/profile",
            get(http::profile::get_profile_handler).put(http::profile::put_profile_handler),
        )
        .route("/v1/records", get(http::records::records_handler))
        .route("/v1/records/latest", get(http::records::latest_record_handler))
        .route(
            "/v1/metrics/categories",
            get(http::records::category_breakdown_handler),
        )
        .route(
            "/v1/metrics/scopes",
            get(http::records::scope_breakdown_handler),
        )
        .route("/v1/metrics/yearly", get(http::records::yearly_handler))
        .route(
            "/v1/scenarios",
            get(http::scenarios::list_scenarios_handler)
                .post(http::scenarios::create_scenario_handler),
        )
        .route(
            "/v1/scenarios/:id",
            put(http::scenarios::update_scenario_handler)
                .delete(http::scenarios::delete_scenario_handler),
        )
        .route(
            "/v1/scenarios/:id/activate",
            post(http::scenarios::activate_scenario_handler),
        )
        .route("/v1/progress", get(http::scenarios::progress_handler))
        .route(
            "/v1/reports/:source_file",
            get(http::reports::get_report_handler).put(http::reports::put_report_handler),
        )
        .route("/v1/chat", post(http::chat::chat_handler))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .merge(passthrough)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

pub(crate) fn render_metrics(metrics: &RequestMetrics) -> String {
    use std::sync::atomic::Ordering;
    let mut lines: Vec<(&str, u64)> = vec![
        ("verdant_requests_total", metrics.requests_total.load(Ordering::Relaxed)),
        ("verdant_errors_total", metrics.errors_total.load(Ordering::Relaxed)),
        ("verdant_uploads_total", metrics.uploads_total.load(Ordering::Relaxed)),
        (
            "verdant_upload_failures_total",
            metrics.upload_failures_total.load(Ordering::Relaxed),
        ),
        (
            "verdant_proxy_requests_total",
            metrics.proxy_requests_total.load(Ordering::Relaxed),
        ),
        (
            "verdant_chat_requests_total",
            metrics.chat_requests_total.load(Ordering::Relaxed),
        ),
        (
            "verdant_rate_limited_total",
            metrics.rate_limited_total.load(Ordering::Relaxed),
        ),
    ];
    lines.sort_by(|a, b| a.0.cmp(b.0));
    let mut out = String::new();
    for (name, value) in lines {
        out.push_str(&format!("# TYPE {name} counter\n{name} {value}\n"));
    }
    out
}

#[cfg(test)]
mod router_tests;
