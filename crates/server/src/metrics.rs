//! Prometheus metrics for the fragments server.
//!
//! Counters carry no owner ids or fragment ids, only aggregate activity.
//! The `/metrics` endpoint is unauthenticated; restrict it at the network
//! level or disable it with `server.metrics_enabled = false`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static FRAGMENTS_CREATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fragments_created_total",
        "Total number of fragments created",
    )
    .expect("metric creation failed")
});

pub static FRAGMENTS_UPDATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fragments_updated_total",
        "Total number of fragment data replacements",
    )
    .expect("metric creation failed")
});

pub static FRAGMENTS_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fragments_deleted_total",
        "Total number of fragment deletes performed",
    )
    .expect("metric creation failed")
});

pub static BYTES_WRITTEN: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "fragments_bytes_written_total",
        "Total fragment bytes written by create and update",
    )
    .expect("metric creation failed")
});

pub static CONVERSIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fragments_conversions_total",
            "Total fragment conversions by target media type",
        ),
        &["target"],
    )
    .expect("metric creation failed")
});

pub static API_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("fragments_api_errors_total", "Total API errors by error code"),
        &["code"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so tests and embedders may call it freely.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(FRAGMENTS_CREATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FRAGMENTS_UPDATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FRAGMENTS_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(BYTES_WRITTEN.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(CONVERSIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(API_ERRORS.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a fragment write of `size` bytes.
pub fn record_write(created: bool, size: usize) {
    if created {
        FRAGMENTS_CREATED.inc();
    } else {
        FRAGMENTS_UPDATED.inc();
    }
    BYTES_WRITTEN.inc_by(size as u64);
}
