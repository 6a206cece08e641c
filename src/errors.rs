// Error types and error handling module
// This file defines the internal error types raised while enriching
// request telemetry with function metadata
//
// Numan Thabit 2025 Nov

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unable to load credential file {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("body read error: {0}")]
    Body(String),
    #[error("control plane url not configured")]
    NotConfigured,
}
