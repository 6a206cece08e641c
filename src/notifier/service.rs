// Service metrics notifier
// Records call counts and latencies for control-plane endpoints
//
// Numan Thabit 2025 Nov

use super::{HttpNotifier, Notification};
use crate::metrics::GatewayMetrics;
use crate::routing::normalize_service_path;
use async_trait::async_trait;

#[derive(Clone)]
pub struct ServiceMetricsNotifier {
    metrics: GatewayMetrics,
}

impl ServiceMetricsNotifier {
    pub fn new(metrics: GatewayMetrics) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl HttpNotifier for ServiceMetricsNotifier {
    // Every event counts, started included.
    async fn notify(&self, n: &Notification<'_>) {
        let code = n.status.to_string();
        let path = normalize_service_path(n.forwarded_url);

        self.metrics.inc_service(n.method, &path, &code);
        self.metrics
            .observe_service(n.method, &path, &code, n.duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;
    use std::time::Duration;

    #[tokio::test]
    async fn records_control_plane_calls() {
        let registry = Registry::new();
        let metrics = GatewayMetrics::register(&registry).unwrap();
        let notifier = ServiceMetricsNotifier::new(metrics.clone());

        notifier
            .notify(&Notification::completed(
                "POST",
                "/system/functions/",
                "/ignored",
                202,
                Duration::from_millis(30),
            ))
            .await;

        let labels = ["POST", "/system/functions", "202"];
        assert_eq!(metrics.service.counter.with_label_values(&labels).get(), 1.0);
        let histogram = metrics.service.histogram.with_label_values(&labels);
        assert_eq!(histogram.get_sample_count(), 1);
        assert!((histogram.get_sample_sum() - 0.030).abs() < 1e-9);
    }

    #[tokio::test]
    async fn root_and_empty_paths_collapse_to_slash() {
        let registry = Registry::new();
        let metrics = GatewayMetrics::register(&registry).unwrap();
        let notifier = ServiceMetricsNotifier::new(metrics.clone());

        for path in ["", "/", "//"] {
            notifier
                .notify(&Notification::completed("GET", path, path, 200, Duration::ZERO))
                .await;
        }

        assert_eq!(
            metrics
                .service
                .counter
                .with_label_values(&["GET", "/", "200"])
                .get(),
            3.0
        );
    }
}
