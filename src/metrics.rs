// Metrics and observability module
// This file registers the gateway's Prometheus instruments and exposes the
// adapter used by the notifiers to record invocations and latencies
//
// Numan Thabit 2025 Nov

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Registry, TextEncoder,
};
use std::time::Duration;

pub const FUNCTION_NAME_LABEL: &str = "function_name";
pub const CODE_LABEL: &str = "code";
/// Copied verbatim from the function's `prometheus_labels` annotation, which
/// deployers control. Keep the set of values small: every distinct value adds a
/// full histogram series per function.
pub const INFRA_TYPE_LABEL: &str = "infra_type";
pub const METHOD_LABEL: &str = "method";
pub const PATH_LABEL: &str = "path";

/// Process-global instrument set, registered against the default registry.
pub static GATEWAY_METRICS: Lazy<GatewayMetrics> = Lazy::new(|| {
    GatewayMetrics::register(prometheus::default_registry())
        .expect("register gateway metrics with the default registry")
});

/// Instruments for function invocations routed through `/function/`.
///
/// Cloning is cheap: every vec is reference counted internally.
#[derive(Clone)]
pub struct GatewayMetrics {
    pub function_invocation: CounterVec,
    pub function_invocation_started: CounterVec,
    /// Labelled by function and `infra_type`; see [`INFRA_TYPE_LABEL`] on cardinality.
    pub functions_histogram: HistogramVec,
    pub service: ServiceMetrics,
}

/// Instruments for control-plane endpoints.
#[derive(Clone)]
pub struct ServiceMetrics {
    pub counter: CounterVec,
    pub histogram: HistogramVec,
}

impl GatewayMetrics {
    /// Register all five instruments with `registry`.
    ///
    /// Fails if any of them is already registered there, which keeps the label
    /// schema of every series fixed for the lifetime of the registry.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let function_invocation = register_counter_vec_with_registry!(
            "invocation_total",
            "Function metrics",
            &[FUNCTION_NAME_LABEL, CODE_LABEL],
            registry
        )?;
        let function_invocation_started = register_counter_vec_with_registry!(
            "invocation_started_total",
            "The total number of function HTTP requests started.",
            &[FUNCTION_NAME_LABEL],
            registry
        )?;
        let functions_histogram = register_histogram_vec_with_registry!(
            "functions_seconds",
            "Function time taken",
            &[FUNCTION_NAME_LABEL, INFRA_TYPE_LABEL],
            registry
        )?;
        let service = ServiceMetrics {
            counter: register_counter_vec_with_registry!(
                "service_calls_total",
                "Total number of HTTP requests to control-plane endpoints.",
                &[METHOD_LABEL, PATH_LABEL, CODE_LABEL],
                registry
            )?,
            histogram: register_histogram_vec_with_registry!(
                "service_calls_seconds",
                "Seconds spent serving control-plane HTTP requests.",
                &[METHOD_LABEL, PATH_LABEL, CODE_LABEL],
                registry
            )?,
        };

        Ok(Self {
            function_invocation,
            function_invocation_started,
            functions_histogram,
            service,
        })
    }

    pub fn inc_invocation(&self, function: &str, code: &str) {
        self.function_invocation
            .with_label_values(&[function, code])
            .inc();
    }

    pub fn inc_started(&self, function: &str) {
        self.function_invocation_started
            .with_label_values(&[function])
            .inc();
    }

    pub fn observe_duration(&self, function: &str, infra: &str, seconds: f64) {
        self.functions_histogram
            .with_label_values(&[function, infra])
            .observe(seconds);
    }

    pub fn inc_service(&self, method: &str, path: &str, code: &str) {
        self.service
            .counter
            .with_label_values(&[method, path, code])
            .inc();
    }

    pub fn observe_service(&self, method: &str, path: &str, code: &str, seconds: f64) {
        self.service
            .histogram
            .with_label_values(&[method, path, code])
            .observe(seconds);
    }
}

/// Count an invocation outside the notifier pipeline.
pub fn track_invocation(metrics: &GatewayMetrics, service: &str, code: u16) {
    metrics.inc_invocation(service, &code.to_string());
}

/// Record a function latency, in seconds, outside the notifier pipeline.
pub fn track_time(metrics: &GatewayMetrics, service: &str, infra: &str, duration: Duration) {
    metrics.observe_duration(service, infra, duration.as_secs_f64());
}

/// Record the raw nanosecond count of `duration` with no unit conversion.
///
/// Prefer [`track_time`]; this one does not produce seconds.
pub fn track_time_exact(duration: Duration, metrics: &GatewayMetrics, service: &str, infra: &str) {
    metrics.observe_duration(service, infra, duration.as_nanos() as f64);
}

/// Render every metric family in `registry` in the Prometheus text format.
pub fn encode_text(registry: &Registry) -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&registry.gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(format!("metrics not utf-8: {e}")))
}
