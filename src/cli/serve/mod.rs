//! Serve command - runs the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::create_router_with_state;
use crate::api::state::PasswordResetServiceTrait;
use crate::config::AppConfig;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let state = crate::create_app_state_with_config(&config).await?;
    let sweeper = spawn_expired_token_sweeper(
        Arc::clone(&state.password_reset_service),
        config.password_reset.purge_interval_minutes,
    );
    let app = create_router_with_state(state);

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("API server shutdown complete");

    Ok(())
}

/// Periodically delete expired reset tokens; `None` when the interval is 0
pub fn spawn_expired_token_sweeper(
    service: Arc<dyn PasswordResetServiceTrait>,
    interval_minutes: u64,
) -> Option<JoinHandle<()>> {
    if interval_minutes == 0 {
        return None;
    }

    let period = Duration::from_secs(interval_minutes * 60);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = service.purge_expired().await {
                error!(error = %e, "Expired reset token sweep failed");
            }
        }
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let addr = build_socket_addr(&AppConfig::default()).unwrap();
        assert_eq!(addr.port(), 8080);

        let mut config = AppConfig::default();
        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }

    #[tokio::test]
    async fn test_sweeper_disabled_at_zero_interval() {
        let state = crate::create_app_state().await.unwrap();

        assert!(spawn_expired_token_sweeper(state.password_reset_service, 0).is_none());
    }
}
