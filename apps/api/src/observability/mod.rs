pub mod metrics;

pub use metrics::{metrics_handler, track_requests, Metrics};
