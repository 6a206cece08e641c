// Function metadata lookup module
// This file resolves a function's infrastructure-type label by querying
// the control-plane function endpoint with HTTP basic auth
//
// Numan Thabit 2025 Nov

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_USER_FILE: &str = "/var/secrets/basic-auth-user";
pub const DEFAULT_PASSWORD_FILE: &str = "/var/secrets/basic-auth-password";

const ANNOTATIONS_KEY: &str = "annotations";
const INFRA_LABEL_KEY: &str = "prometheus_labels";

/// Anything that can map a function name to its infra-type label.
///
/// Implementations never fail: an unknown label is the empty string.
#[async_trait]
pub trait InfraTypeSource: Send + Sync {
    async fn infra_type(&self, service: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    pub user: PathBuf,
    pub password: PathBuf,
}

impl Default for CredentialPaths {
    fn default() -> Self {
        Self {
            user: PathBuf::from(DEFAULT_USER_FILE),
            password: PathBuf::from(DEFAULT_PASSWORD_FILE),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read both credential files, password first, trimming surrounding whitespace.
    pub async fn load(paths: &CredentialPaths) -> Result<Self, GatewayError> {
        let password = read_secret(&paths.password).await?;
        let user = read_secret(&paths.user).await?;
        Ok(Self { user, password })
    }
}

async fn read_secret(path: &Path) -> Result<String, GatewayError> {
    tokio::fs::read_to_string(path)
        .await
        .map(|raw| raw.trim().to_string())
        .map_err(|source| GatewayError::Credentials {
            path: path.to_path_buf(),
            source,
        })
}

/// Control-plane backed resolver. Every call re-reads credentials and
/// performs a fresh `GET {base}/system/function/{service}`.
#[derive(Debug, Clone)]
pub struct InfraTypeResolver {
    http: Client,
    base_url: Option<String>,
    credentials: CredentialPaths,
}

impl InfraTypeResolver {
    pub fn new(
        base_url: Option<String>,
        credentials: CredentialPaths,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client for function metadata lookups")?;
        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn from_config(cfg: &GatewayConfig) -> Result<Self> {
        Self::new(
            cfg.serverlessurl.clone(),
            cfg.credential_paths(),
            cfg.infra_lookup_timeout(),
        )
    }

    pub fn endpoint(&self, service: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{base}/system/function/{service}"))
    }

    /// Resolve the label for `service`, collapsing every failure to `""`.
    pub async fn resolve(&self, service: &str) -> String {
        if service.is_empty() {
            return String::new();
        }
        match self.fetch_metadata(service).await {
            Ok(body) => infra_label_from_body(&body),
            Err(GatewayError::NotConfigured) => {
                debug!(service, "serverlessurl not set; skipping infra type lookup");
                String::new()
            }
            Err(err) => {
                warn!(service, error = %err, "infra type lookup failed");
                String::new()
            }
        }
    }

    async fn fetch_metadata(&self, service: &str) -> Result<String, GatewayError> {
        let url = self.endpoint(service).ok_or(GatewayError::NotConfigured)?;
        let creds = Credentials::load(&self.credentials).await?;

        let resp = self
            .http
            .get(&url)
            .basic_auth(&creds.user, Some(&creds.password))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("GET {url}: {e}")))?;
        if !resp.status().is_success() {
            debug!(
                service,
                status = %resp.status(),
                "function metadata lookup returned non-success"
            );
        }
        resp.text()
            .await
            .map_err(|e| GatewayError::Body(e.to_string()))
    }
}

#[async_trait]
impl InfraTypeSource for InfraTypeResolver {
    async fn infra_type(&self, service: &str) -> String {
        self.resolve(service).await
    }
}

/// Pull `annotations.prometheus_labels` out of a function metadata document.
///
/// Malformed JSON, missing keys and non-string values all yield `""`.
pub fn infra_label_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .as_ref()
        .and_then(|doc| doc.get(ANNOTATIONS_KEY))
        .and_then(|annotations| annotations.as_object())
        .and_then(|annotations| annotations.get(INFRA_LABEL_KEY))
        .and_then(|label| label.as_str())
        .map(str::to_owned)
        .unwrap_or_default()
}
