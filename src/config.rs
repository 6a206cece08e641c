// Configuration management module
// This file handles loading and parsing of configuration settings
// from environment variables
//
// Numan Thabit 2025 Nov

use crate::infra::{CredentialPaths, DEFAULT_PASSWORD_FILE, DEFAULT_USER_FILE};
use anyhow::Result;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Control-plane base URL, e.g. http://gateway:8080
    pub serverlessurl: Option<String>,
    /// Default namespace appended to bare function names (may be empty)
    pub function_namespace: String,
    /// File holding the basic-auth user for control-plane lookups
    pub basic_auth_user_file: PathBuf,
    /// File holding the basic-auth password for control-plane lookups
    pub basic_auth_password_file: PathBuf,
    /// Upper bound on a single function metadata lookup
    pub infra_lookup_timeout_secs: u64,
    /// Infra-type cache TTL; 0 disables caching
    pub infra_cache_ttl_secs: u64,
    /// Max number of cached infra-type entries
    pub infra_cache_capacity: usize,
    /// Listen address for the gateway binary
    pub bind_addr: SocketAddr,
    /// Backend that `/function/` and `/system/` requests are forwarded to
    pub upstream_url: Option<Url>,
    /// Upper bound on a single forwarded request
    pub upstream_timeout_secs: u64,
}

impl GatewayConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(config::Environment::default().separator("__"))
    }

    pub fn load_from(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("function_namespace", "")?
            .set_default("basic_auth_user_file", DEFAULT_USER_FILE)?
            .set_default("basic_auth_password_file", DEFAULT_PASSWORD_FILE)?
            .set_default("infra_lookup_timeout_secs", 5_i64)?
            .set_default("infra_cache_ttl_secs", 0_i64)?
            .set_default("infra_cache_capacity", 512_i64)?
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("upstream_timeout_secs", 60_i64)?
            .add_source(env)
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn credential_paths(&self) -> CredentialPaths {
        CredentialPaths {
            user: self.basic_auth_user_file.clone(),
            password: self.basic_auth_password_file.clone(),
        }
    }

    pub fn infra_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.infra_lookup_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// `None` when the cache layer is disabled.
    pub fn infra_cache_ttl(&self) -> Option<Duration> {
        (self.infra_cache_ttl_secs > 0).then(|| Duration::from_secs(self.infra_cache_ttl_secs))
    }
}
