//! Metrics collection and exposition.
//!
//! # Metrics
//! - `glb_selections_total` (counter): backends handed out, by strategy
//! - `glb_cancelled_calls_total` (counter): calls rejected on a cancelled context
//! - `glb_in_flight` (gauge): attributed callers, least connections strategies only
//!
//! Every metric carries a `strategy` label.

use std::net::SocketAddr;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use crate::load_balancer::Strategy;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!("glb_selections_total", "Backends handed out to callers");
    describe_counter!("glb_cancelled_calls_total", "Calls rejected because the context was already cancelled");
    describe_gauge!("glb_in_flight", "Callers currently attributed to a backend");
}

pub fn record_selection(strategy: Strategy) {
    counter!("glb_selections_total", "strategy" => strategy.as_str()).increment(1);
}

pub fn record_cancelled_call(strategy: Strategy) {
    counter!("glb_cancelled_calls_total", "strategy" => strategy.as_str()).increment(1);
}

pub fn record_acquired(strategy: Strategy) {
    gauge!("glb_in_flight", "strategy" => strategy.as_str()).increment(1.0);
}

pub fn record_released(strategy: Strategy) {
    gauge!("glb_in_flight", "strategy" => strategy.as_str()).decrement(1.0);
}
