//! In-process request metrics rendered in the Prometheus text format.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Default)]
struct Latency {
    sum_seconds: f64,
    count: u64,
}

#[derive(Debug, Default)]
pub struct Metrics {
    requests: Mutex<BTreeMap<(String, String, u16), u64>>,
    latency: Mutex<BTreeMap<(String, String), Latency>>,
    interpretations: Mutex<BTreeMap<String, u64>>,
    in_flight: AtomicI64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Metrics {
    pub fn observe_request(&self, method: &str, route: &str, status: u16, seconds: f64) {
        *lock(&self.requests)
            .entry((method.to_string(), route.to_string(), status))
            .or_insert(0) += 1;

        let mut latency = lock(&self.latency);
        let entry = latency
            .entry((method.to_string(), route.to_string()))
            .or_default();
        entry.sum_seconds += seconds;
        entry.count += 1;
    }

    /// Counts how model output was interpreted: `strict`, `tolerant` or an error kind.
    pub fn observe_interpretation(&self, outcome: &str) {
        *lock(&self.interpretations)
            .entry(outcome.to_string())
            .or_insert(0) += 1;
    }

    pub fn request_count(&self, method: &str, route: &str, status: u16) -> u64 {
        lock(&self.requests)
            .get(&(method.to_string(), route.to_string(), status))
            .copied()
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP http_requests_total Total HTTP requests by method, route and status.\n");
        out.push_str("# TYPE http_requests_total counter\n");
        for ((method, route, status), count) in lock(&self.requests).iter() {
            let _ = writeln!(
                out,
                "http_requests_total{{method=\"{method}\",route=\"{}\",status=\"{status}\"}} {count}",
                escape(route)
            );
        }

        out.push_str("# HELP http_request_duration_seconds Request latency by method and route.\n");
        out.push_str("# TYPE http_request_duration_seconds summary\n");
        for ((method, route), l) in lock(&self.latency).iter() {
            let labels = format!("method=\"{method}\",route=\"{}\"", escape(route));
            let _ = writeln!(out, "http_request_duration_seconds_sum{{{labels}}} {}", l.sum_seconds);
            let _ = writeln!(out, "http_request_duration_seconds_count{{{labels}}} {}", l.count);
        }

        out.push_str("# HELP http_requests_in_flight Requests currently being served.\n");
        out.push_str("# TYPE http_requests_in_flight gauge\n");
        let _ = writeln!(
            out,
            "http_requests_in_flight {}",
            self.in_flight.load(Ordering::Relaxed)
        );

        out.push_str("# HELP model_output_interpretations_total Model output parse outcomes.\n");
        out.push_str("# TYPE model_output_interpretations_total counter\n");
        for (outcome, count) in lock(&self.interpretations).iter() {
            let _ = writeln!(
                out,
                "model_output_interpretations_total{{outcome=\"{}\"}} {count}",
                escape(outcome)
            );
        }

        out
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Holds one slot of the in-flight gauge. Released on drop, so a request
/// future cancelled mid-flight (client gone, timeout) still decrements it.
struct InFlight<'a>(&'a Metrics);

impl<'a> InFlight<'a> {
    fn enter(metrics: &'a Metrics) -> Self {
        metrics.in_flight.fetch_add(1, Ordering::Relaxed);
        Self(metrics)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Route middleware recording count, status and latency. Mounted with
/// `route_layer` so `MatchedPath` is available and label cardinality stays bounded.
pub async fn track_requests(
    State(metrics): State<Arc<Metrics>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let in_flight = InFlight::enter(&metrics);
    let started = Instant::now();
    let response = next.run(req).await;
    drop(in_flight);

    metrics.observe_request(
        &method,
        &route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

/// GET /metrics
pub async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE))],
        metrics.render(),
    )
}
