//! gquota exporter
//!
//! - Polls Compute Engine regional and project quotas on a fixed interval
//! - Republishes them as `gcloud_<resource>_quota_{limit,usage,ratio}` gauges
//! - Serves Prometheus text on `/metrics` (and `/`)

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use gquota_exporter::{app_state, config, router, scheduler, source::ComputeApiClient};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = match config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let listen = match cfg.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(project_id = %cfg.project_id, "initialization");
    let client = match ComputeApiClient::from_config(&cfg) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to build compute client");
            return ExitCode::FAILURE;
        }
    };

    let state = app_state::AppState::new(cfg, Arc::new(client));
    let period = Duration::from_secs(state.cfg().refresh_interval_secs);
    let publisher = state.publisher();

    tracing::info!("verifying permissions");
    scheduler::run_guarded(&publisher).await;

    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%listen, "gquota-exporter serving metrics");

    tracing::info!(interval_secs = period.as_secs(), "starting scheduler");
    let refresh = scheduler::spawn_refresh_loop(publisher, period);

    let app = router::build_router(state);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    refresh.abort();

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutting down");
}
