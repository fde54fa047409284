//! Prometheus metrics collection for bindery.
//!
//! Exposed on `GET /metrics` when `server.metrics` is enabled.
//!
//! - `bindery_binding_transitions_total{op,outcome}` - bind/unbind outcomes
//! - `bindery_bound` - 1 while the resource is bound
//! - `bindery_guard_rejections_total{guard,kind}` - admission failures
//! - `bindery_actions_total{action,outcome}` - resource/service actions
//! - `bindery_action_duration_seconds{action}` - action latency
//! - `bindery_delegations_total{resource,outcome}` - remote leases taken

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};
use std::time::Duration;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Binding
// ========================================================================

/// Binding transitions by operation and outcome.
pub static BINDING_TRANSITIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Whether the resource is currently bound.
pub static BOUND: OnceLock<IntGauge> = OnceLock::new();

/// Requests rejected by a guard.
pub static GUARD_REJECTIONS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Actions and delegation
// ========================================================================

pub static ACTIONS: OnceLock<IntCounterVec> = OnceLock::new();

pub static ACTION_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

pub static DELEGATIONS: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers anything.
/// Recording before `init` is a no-op.
pub fn init() {
    INIT.call_once(|| {
        let r = registry();

        macro_rules! register {
            ($metric:ident, $init:expr) => {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            };
        }

        register!(BINDING_TRANSITIONS, IntCounterVec::new(Opts::new("bindery_binding_transitions_total", "Binding transitions by operation and outcome"), &["op", "outcome"]));
        register!(BOUND, IntGauge::new("bindery_bound", "1 while the resource is bound"));
        register!(GUARD_REJECTIONS, IntCounterVec::new(Opts::new("bindery_guard_rejections_total", "Requests rejected during admission"), &["guard", "kind"]));
        register!(ACTIONS, IntCounterVec::new(Opts::new("bindery_actions_total", "Actions executed by name and outcome"), &["action", "outcome"]));
        register!(ACTION_LATENCY, HistogramVec::new(
            HistogramOpts::new("bindery_action_duration_seconds", "Action latency by name")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["action"]));
        register!(DELEGATIONS, IntCounterVec::new(Opts::new("bindery_delegations_total", "Remote leases by resource and outcome"), &["resource", "outcome"]));
    });
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a bind/unbind outcome (`acquired`, `renewed`, `released`, or an error code).
#[inline]
pub fn record_transition(op: &str, outcome: &str) {
    if let Some(c) = BINDING_TRANSITIONS.get() {
        c.with_label_values(&[op, outcome]).inc();
    }
}

#[inline]
pub fn set_bound(bound: bool) {
    if let Some(g) = BOUND.get() {
        g.set(i64::from(bound));
    }
}

#[inline]
pub fn record_rejection(guard: &str, kind: &str) {
    if let Some(c) = GUARD_REJECTIONS.get() {
        c.with_label_values(&[guard, kind]).inc();
    }
}

/// Record an executed action with latency.
#[inline]
pub fn record_action(action: &str, outcome: &str, duration: Duration) {
    if let Some(c) = ACTIONS.get() {
        c.with_label_values(&[action, outcome]).inc();
    }
    if let Some(h) = ACTION_LATENCY.get() {
        h.with_label_values(&[action]).observe(duration.as_secs_f64());
    }
}

#[inline]
pub fn record_delegation(resource: &str, outcome: &str) {
    if let Some(c) = DELEGATIONS.get() {
        c.with_label_values(&[resource, outcome]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_transition("bind", "acquired");
        record_action("example", "ok", Duration::from_millis(3));
        set_bound(true);

        let output = gather_metrics();
        assert!(output.contains("bindery_binding_transitions_total"));
        assert!(output.contains("bindery_action_duration_seconds"));
        assert!(output.contains("bindery_bound"));
    }
}
