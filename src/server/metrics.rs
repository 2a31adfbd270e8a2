use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all recommender metrics
const PREFIX: &str = "iem";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Recommendation Metrics
    pub static ref RECOMMENDATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_recommendations_total"), "Recommendation requests by budget and outcome"),
        &["budget", "outcome"]
    ).expect("Failed to create recommendations_total metric");

    pub static ref GENRE_FALLBACKS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_genre_fallbacks_total"),
        "Queries whose genre was not in the codebook"
    ).expect("Failed to create genre_fallbacks_total metric");

    // Image relay Metrics
    pub static ref IMAGE_RELAY_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_image_relay_total"), "Image relay requests by result"),
        &["result"]
    ).expect("Failed to create image_relay_total metric");

    // Catalog Metrics
    pub static ref CATALOG_PRODUCTS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_products_total"),
        "Number of products in the prepared catalog"
    ).expect("Failed to create catalog_products_total metric");

    pub static ref CATALOG_GENRES_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_genres_total"),
        "Number of genres in the codebook"
    ).expect("Failed to create catalog_genres_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GENRE_FALLBACKS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(IMAGE_RELAY_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_PRODUCTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_GENRES_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn init_catalog_metrics(num_products: usize, num_genres: usize) {
    CATALOG_PRODUCTS_TOTAL.set(num_products as f64);
    CATALOG_GENRES_TOTAL.set(num_genres as f64);

    tracing::info!(
        "Catalog metrics initialized: {} products, {} genres",
        num_products,
        num_genres
    );
}

/// Maps a request path to a fixed endpoint label.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "home",
        "/api/recommend" => "recommend",
        "/api/options" => "options",
        "/img" => "image_relay",
        p if p.starts_with("/static/") => "static",
        _ => "other",
    }
}

pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// `outcome` is one of "matched", "no_match" or "invalid".
/// `budget` must be a bracket label, never raw client input.
pub fn record_recommendation(budget: &str, outcome: &str) {
    RECOMMENDATIONS_TOTAL
        .with_label_values(&[budget, outcome])
        .inc();
}

pub fn record_genre_fallback() {
    GENRE_FALLBACKS_TOTAL.inc();
}

pub fn record_image_relay(result: &str) {
    IMAGE_RELAY_TOTAL.with_label_values(&[result]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
