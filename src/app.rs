// Application wiring
// This file assembles the notifier chains and the HTTP router served by
// the gateway binary
//
// Numan Thabit 2025 Nov

use crate::cache::CachedInfraTypes;
use crate::config::GatewayConfig;
use crate::infra::{InfraTypeResolver, InfraTypeSource};
use crate::metrics::{encode_text, GatewayMetrics};
use crate::middleware::notify_requests;
use crate::notifier::{
    FanoutNotifier, FunctionMetricsNotifier, HttpNotifier, LoggingNotifier,
    ServiceMetricsNotifier,
};
use crate::proxy::{forward, Forwarder};
use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use prometheus::Registry;
use std::sync::Arc;
use tracing::{info, warn};

/// Notifier chains for the two route families.
#[derive(Clone)]
pub struct Notifiers {
    pub function: Arc<dyn HttpNotifier>,
    pub service: Arc<dyn HttpNotifier>,
}

impl Notifiers {
    pub fn new(
        metrics: GatewayMetrics,
        infra: Arc<dyn InfraTypeSource>,
        function_namespace: &str,
    ) -> Self {
        let function = FanoutNotifier::new()
            .with(FunctionMetricsNotifier::new(
                metrics.clone(),
                infra,
                function_namespace,
            ))
            .with(LoggingNotifier::new());
        let service = FanoutNotifier::new()
            .with(ServiceMetricsNotifier::new(metrics))
            .with(LoggingNotifier::new());
        Self {
            function: Arc::new(function),
            service: Arc::new(service),
        }
    }
}

/// Control-plane resolver, behind the TTL cache when one is configured.
pub fn infra_source(cfg: &GatewayConfig) -> Result<Arc<dyn InfraTypeSource>> {
    let resolver = InfraTypeResolver::from_config(cfg)?;
    Ok(match cfg.infra_cache_ttl() {
        Some(ttl) => {
            info!(
                ttl_secs = ttl.as_secs(),
                capacity = cfg.infra_cache_capacity,
                "infra type cache enabled"
            );
            Arc::new(CachedInfraTypes::new(resolver, ttl, cfg.infra_cache_capacity))
        }
        None => Arc::new(resolver),
    })
}

pub fn build_router(forwarder: Forwarder, notifiers: Notifiers, registry: Registry) -> Router {
    let functions = Router::new()
        .route("/function/*rest", any(forward))
        .route_layer(from_fn_with_state(notifiers.function, notify_requests))
        .with_state(forwarder.clone());
    let system = Router::new()
        .route("/system/*rest", any(forward))
        .route_layer(from_fn_with_state(notifiers.service, notify_requests))
        .with_state(forwarder);

    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(health_check))
        .with_state(registry)
        .merge(functions)
        .merge(system)
}

async fn metrics_handler(State(registry): State<Registry>) -> Response {
    match encode_text(&registry) {
        Ok(body) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}
