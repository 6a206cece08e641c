// Function metrics notifier
// This file records invocation counts and latencies for `/function/` routes,
// labelling latencies with the infra type read from the function's metadata
//
// Numan Thabit 2025 Nov

use super::{HttpNotifier, Notification, RequestEvent};
use crate::infra::InfraTypeSource;
use crate::metrics::GatewayMetrics;
use crate::routing::{extract_function_name, qualify_function_name};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone)]
pub struct FunctionMetricsNotifier {
    metrics: GatewayMetrics,
    infra: Arc<dyn InfraTypeSource>,
    /// Default namespace appended to bare function names; may be empty.
    function_namespace: String,
}

impl FunctionMetricsNotifier {
    pub fn new(
        metrics: GatewayMetrics,
        infra: Arc<dyn InfraTypeSource>,
        function_namespace: impl Into<String>,
    ) -> Self {
        Self {
            metrics,
            infra,
            function_namespace: function_namespace.into(),
        }
    }
}

#[async_trait]
impl HttpNotifier for FunctionMetricsNotifier {
    async fn notify(&self, n: &Notification<'_>) {
        match n.event {
            // The started counter keeps the raw, unqualified name.
            RequestEvent::Started => {
                let service = extract_function_name(n.original_url);
                self.metrics.inc_started(&service);
            }
            RequestEvent::Completed => {
                let service = extract_function_name(n.original_url);
                // Lookup uses the name before namespace qualification.
                let infra = self.infra.infra_type(&service).await;
                let service = qualify_function_name(&service, &self.function_namespace);

                self.metrics
                    .observe_duration(&service, &infra, n.duration.as_secs_f64());
                self.metrics
                    .inc_invocation(&service, &n.status.to_string());
            }
            RequestEvent::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::testing::StaticInfra;
    use prometheus::Registry;
    use std::time::Duration;

    fn setup(
        label: &str,
        namespace: &str,
    ) -> (GatewayMetrics, Arc<StaticInfra>, FunctionMetricsNotifier) {
        let registry = Registry::new();
        let metrics = GatewayMetrics::register(&registry).unwrap();
        let infra = StaticInfra::new(label);
        let notifier = FunctionMetricsNotifier::new(metrics.clone(), infra.clone(), namespace);
        (metrics, infra, notifier)
    }

    #[tokio::test]
    async fn started_counts_raw_name_without_lookup() {
        let (metrics, infra, notifier) = setup("gpu", "openfaas-fn");

        notifier
            .notify(&Notification::started("GET", "/function/echo", "/function/echo"))
            .await;

        assert_eq!(
            metrics
                .function_invocation_started
                .with_label_values(&["echo"])
                .get(),
            1.0
        );
        assert_eq!(infra.calls(), 0);
        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["echo.openfaas-fn", "200"])
                .get(),
            0.0
        );
    }

    #[tokio::test]
    async fn completed_records_qualified_name_and_infra_type() {
        let (metrics, infra, notifier) = setup("gpu", "openfaas-fn");

        notifier
            .notify(&Notification::completed(
                "GET",
                "/function/echo",
                "/function/echo",
                200,
                Duration::from_millis(150),
            ))
            .await;

        let histogram = metrics
            .functions_histogram
            .with_label_values(&["echo.openfaas-fn", "gpu"]);
        assert_eq!(histogram.get_sample_count(), 1);
        assert!((histogram.get_sample_sum() - 0.15).abs() < 1e-9);
        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["echo.openfaas-fn", "200"])
                .get(),
            1.0
        );
        assert_eq!(*infra.seen.lock(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn empty_infra_type_is_kept_verbatim() {
        let (metrics, _infra, notifier) = setup("", "openfaas-fn");

        notifier
            .notify(&Notification::completed(
                "GET",
                "/function/echo",
                "/function/echo",
                200,
                Duration::from_millis(150),
            ))
            .await;

        assert_eq!(
            metrics
                .functions_histogram
                .with_label_values(&["echo.openfaas-fn", ""])
                .get_sample_count(),
            1
        );
    }

    #[tokio::test]
    async fn qualified_names_pass_through() {
        let (metrics, _infra, notifier) = setup("cpu", "openfaas-fn");

        notifier
            .notify(&Notification::completed(
                "POST",
                "/function/echo.staging/sub",
                "/function/echo.staging/sub?x=1",
                500,
                Duration::from_secs(1),
            ))
            .await;

        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["echo.staging", "500"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn non_function_path_records_empty_name() {
        let (metrics, _infra, notifier) = setup("", "");

        notifier
            .notify(&Notification::completed(
                "GET",
                "/health",
                "/health",
                200,
                Duration::from_millis(1),
            ))
            .await;

        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["", "200"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .functions_histogram
                .with_label_values(&["", ""])
                .get_sample_count(),
            1
        );
    }

    #[tokio::test]
    async fn full_request_touches_each_instrument_once() {
        let (metrics, _infra, notifier) = setup("gpu", "");

        notifier
            .notify(&Notification::started("GET", "/function/echo", "/function/echo"))
            .await;
        notifier
            .notify(&Notification::completed(
                "GET",
                "/function/echo",
                "/function/echo",
                200,
                Duration::from_millis(10),
            ))
            .await;

        assert_eq!(
            metrics
                .function_invocation_started
                .with_label_values(&["echo"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["echo", "200"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .functions_histogram
                .with_label_values(&["echo", "gpu"])
                .get_sample_count(),
            1
        );
    }

    #[tokio::test]
    async fn unknown_events_are_ignored() {
        let (metrics, infra, notifier) = setup("gpu", "");
        let mut n = Notification::completed(
            "GET",
            "/function/echo",
            "/function/echo",
            200,
            Duration::from_millis(10),
        );
        n.event = RequestEvent::from("queued");

        notifier.notify(&n).await;

        assert_eq!(infra.calls(), 0);
        assert_eq!(
            metrics
                .function_invocation
                .with_label_values(&["echo", "200"])
                .get(),
            0.0
        );
    }
}
