//! Prometheus metrics registry and instruments.
//!
//! Counters are updated by the API client regardless of whether the
//! registry was initialized; `init_metrics` only makes them gatherable.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("maintenance_desk_api_requests_total", "Total number of backend API requests"),
        &["method", "endpoint", "outcome"]
    ).expect("metric can be created");
    pub static ref API_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "maintenance_desk_api_request_duration_seconds",
            "Backend API request duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    pub static ref SCREEN_REFRESHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("maintenance_desk_screen_refreshes_total", "Total number of focus-driven refreshes"),
        &["screen", "outcome"]
    ).expect("metric can be created");

    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("maintenance_desk_errors_total", "Total number of errors surfaced to screens"),
        &["error_type", "screen"]
    ).expect("metric can be created");
}

/// Routes whose next path segment is a record id. Longer prefixes first.
const ID_ROUTES: &[&str] = &[
    "/tickets/assign-priority",
    "/tickets",
    "/progress-history",
    "/ticket-reviews",
    "/residents/close-ticket",
    "/residents/reopen-ticket",
    "/technicians/update-time",
    "/technicians/resolve-ticket",
    "/notifications",
];

/// Routes sent without an id.
const FIXED_ROUTES: &[&str] = &[
    "/tickets",
    "/notifications",
    "/users/technicians",
    "/utility/excel",
    "/utility/pdf",
    "/auth/login",
    "/auth/me",
    "/auth/register",
];

/// Collapse an API path into a low-cardinality endpoint label.
///
/// Everything after a known id route's prefix becomes `:id`, whatever the
/// id looks like. Paths matching no known route are labelled `other`.
pub fn endpoint_label(path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');

    if let Some(route) = FIXED_ROUTES.iter().find(|route| **route == path) {
        return (*route).to_string();
    }

    ID_ROUTES
        .iter()
        .find(|route| {
            path.strip_prefix(**route)
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|id| !id.is_empty())
        })
        .map(|route| format!("{}/:id", route))
        .unwrap_or_else(|| "other".to_string())
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(API_REQUESTS_TOTAL.clone()))
        .expect("API_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(API_REQUEST_DURATION_SECONDS.clone()))
        .expect("API_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(SCREEN_REFRESHES_TOTAL.clone()))
        .expect("SCREEN_REFRESHES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
