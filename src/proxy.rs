// Upstream forwarding module
// This file implements the minimal reverse proxy the gateway binary mounts
// under `/function/` and `/system/`
//
// Numan Thabit 2025 Nov

use crate::middleware::ForwardedUrl;
use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;
use url::Url;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    upstream: Option<Url>,
}

impl Forwarder {
    pub fn new(upstream: Option<Url>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client for upstream forwarding")?;
        Ok(Self { http, upstream })
    }

    pub fn upstream(&self) -> Option<&Url> {
        self.upstream.as_ref()
    }

    fn target(&self, path_and_query: &str) -> Option<String> {
        self.upstream.as_ref().map(|base| {
            format!(
                "{}{}",
                base.as_str().trim_end_matches('/'),
                path_and_query
            )
        })
    }
}

/// Copy every header except those the HTTP client owns.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in [
        header::HOST,
        header::CONNECTION,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
    ] {
        out.remove(name);
    }
    out
}

/// Forward the request to the configured upstream, verbatim.
pub async fn forward(State(fwd): State<Forwarder>, request: Request) -> Response {
    let path = request.uri().path().to_owned();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| path.clone());

    let Some(target) = fwd.target(&path_and_query) else {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream not configured").into_response();
    };

    let method = request.method().clone();
    let headers = forwardable(request.headers());
    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "failed to read request body");
            return (StatusCode::BAD_REQUEST, "unreadable request body").into_response();
        }
    };

    let upstream = match fwd
        .http
        .request(method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(err) => {
            warn!(url = %target, error = %err, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };

    let status = upstream.status();
    let headers = forwardable(upstream.headers());
    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(err) => {
            warn!(url = %target, error = %err, "failed to read upstream body");
            return (StatusCode::BAD_GATEWAY, "upstream body unreadable").into_response();
        }
    };

    let mut response = (status, headers, Body::from(body)).into_response();
    response.extensions_mut().insert(ForwardedUrl(path));
    response
}
