use anyhow::{anyhow, Context, Result};
use gateway_telemetry::app::{build_router, infra_source, Notifiers};
use gateway_telemetry::config::GatewayConfig;
use gateway_telemetry::metrics::GATEWAY_METRICS;
use gateway_telemetry::proxy::Forwarder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal gateway error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = GatewayConfig::load().context("load configuration from environment")?;

    if config.serverlessurl.is_none() {
        warn!("serverlessurl not set; infra_type labels will be empty");
    }
    if config.upstream_url.is_none() {
        warn!("upstream_url not set; forwarded routes answer 503");
    }

    let infra = infra_source(&config).context("initialize infra type resolver")?;
    let notifiers = Notifiers::new((*GATEWAY_METRICS).clone(), infra, &config.function_namespace);
    let forwarder = Forwarder::new(config.upstream_url.clone(), config.upstream_timeout())
        .context("initialize upstream forwarder")?;

    let app = build_router(forwarder, notifiers, prometheus::default_registry().clone())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    info!(
        address = %config.bind_addr,
        upstream = ?config.upstream_url.as_ref().map(|u| u.as_str()),
        namespace = %config.function_namespace,
        "gateway telemetry online"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve HTTP")?;
    info!("Shutdown signal received, exiting");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl_c listener error");
    }
}

fn init_tracing() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
