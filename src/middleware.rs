// Request lifecycle middleware
// This file drives the started/completed notifications around a wrapped
// axum handler and measures the elapsed time between them
//
// Numan Thabit 2025 Nov

use crate::notifier::{HttpNotifier, Notification};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use std::time::Instant;

/// Response extension a handler sets to report the path it dispatched to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedUrl(pub String);

/// Notify `notifier` before and after the inner handler runs.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn notify_requests(
    State(notifier): State<Arc<dyn HttpNotifier>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_owned();
    let path = request.uri().path().to_owned();
    let original_url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| path.clone());

    notifier
        .notify(&Notification::started(&method, &path, &original_url))
        .await;

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    let forwarded_url = response
        .extensions()
        .get::<ForwardedUrl>()
        .map(|f| f.0.clone())
        .unwrap_or_else(|| path.clone());

    notifier
        .notify(&Notification::completed(
            &method,
            &forwarded_url,
            &original_url,
            status,
            elapsed,
        ))
        .await;

    response
}
