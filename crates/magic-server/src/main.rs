use anyhow::Context as _;
use magic_core::logging::init_logging;
use magic_core::MagicConfig;
use magic_server::{app_with_state, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MagicConfig::from_env()?;
    init_logging(&config.logging.level, &config.logging.format);

    let state = AppState::from_config(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    tracing::info!(
        %addr,
        provider = config.provider.name(),
        view = %config.gateway.view,
        timeout_secs = config.gateway.timeout_secs,
        "magic-server v{} listening",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app_with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
