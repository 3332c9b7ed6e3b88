use prometheus::{Encoder, TextEncoder, Registry, IntCounterVec};
use lazy_static::lazy_static;
use std::sync::OnceLock;
use axum::response::IntoResponse;
use axum::http::StatusCode;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static BRANCH_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static REDACTION_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    let req_counter = REQ_COUNTER.get_or_init(|| {
        IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"]
        ).unwrap()
    });

    let branch_counter = BRANCH_COUNTER.get_or_init(|| {
        IntCounterVec::new(
            prometheus::opts!("chat_branches_total", "Chat turns resolved per pipeline branch"),
            &["branch"]
        ).unwrap()
    });

    let redaction_counter = REDACTION_COUNTER.get_or_init(|| {
        IntCounterVec::new(
            prometheus::opts!("chat_redactions_total", "Chat log redaction outcomes"),
            &["status"]
        ).unwrap()
    });

    REGISTRY.register(Box::new(req_counter.clone())).ok();
    REGISTRY.register(Box::new(branch_counter.clone())).ok();
    REGISTRY.register(Box::new(redaction_counter.clone())).ok();
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn inc_branch(branch: &str) {
    if let Some(counter) = BRANCH_COUNTER.get() {
        counter.with_label_values(&[branch]).inc();
    }
}

pub fn inc_redaction(status: &str) {
    if let Some(counter) = REDACTION_COUNTER.get() {
        counter.with_label_values(&[status]).inc();
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; version=0.0.4")],
            format!("failed to encode metrics: {}", e),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        String::from_utf8_lossy(&buffer).to_string(),
    )
}
