//! unity3d2png proxy binary.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use u2p_git::GitMirror;
use u2p_server::{
    AppState, ConversionForwarder, PathTemplate, RequestValidator, ServerConfig,
    metrics::init_metrics, run_server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().context("failed to load configuration")?;

    tracing::info!(
        "Starting unity3d2png proxy v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Git: {}", config.git);
    tracing::info!("Repository: {}", config.repository);
    tracing::info!("Workdir: {}", config.workdir.display());
    tracing::info!("Conversion service: {}", config.unity3d2png_url);
    tracing::info!("Path template: {}", config.path_template);

    let mirror = GitMirror::new(config.mirror_config()?);

    mirror
        .check_tool()
        .await
        .with_context(|| format!("git executable {:?} is not usable", config.git))?;

    if !mirror.exists_locally() {
        tracing::info!(
            "No mirror at {}, cloning {}",
            mirror.config().git_dir().display(),
            config.repository
        );
    }
    mirror.ensure_cloned().await.context("initial clone failed")?;

    let template =
        PathTemplate::parse(&config.path_template).context("failed to compile path template")?;

    let forwarder = ConversionForwarder::new(config.downstream_url()?, config.downstream_timeout())?;

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let state = AppState::new(
        Arc::new(mirror),
        template,
        RequestValidator::new(&config.suffix),
        forwarder,
    );

    run_server(&config.bind_addr(), state, prometheus_handle).await?;

    Ok(())
}
