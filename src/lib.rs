// Library root module for gateway-telemetry
// This file defines the public API and module structure: request notifiers,
// function metadata enrichment and the Prometheus instruments they feed
//
// Numan Thabit 2025 Nov

pub mod app;
pub mod cache;
pub mod config;
pub mod errors;
pub mod infra;
pub mod metrics;
pub mod middleware;
pub mod notifier;
pub mod proxy;
pub mod routing;
