//! Intake API server lifecycle: bind → spawn background task → return
//! handle with shutdown channel.
//!
//! A second background task sweeps idle sessions out of `CoreState`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::intake_api_router;
use crate::core_state::{CoreState, DEFAULT_SESSION_IDLE_SECS};

/// How often the sweeper looks for idle sessions.
pub const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ApiServerInfo {
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running intake API server.
pub struct ApiServer {
    pub info: ApiServerInfo,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<()>>,
    sweeper_task: JoinHandle<()>,
}

impl ApiServer {
    /// Signal graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Intake API server shutdown signal sent");
        }
        self.sweeper_task.abort();
    }

    /// Shut down and wait for in-flight requests to drain.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.server_task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Intake API server task ended abnormally");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Server lifecycle
// ═══════════════════════════════════════════════════════════

/// Bind `addr` and serve the intake API in a background task.
///
/// Port 0 picks an ephemeral port; the bound address is in the returned
/// handle's `info`.
pub async fn start_api_server(core: Arc<CoreState>, addr: SocketAddr) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind intake API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let info = ApiServerInfo {
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let app = intake_api_router(core.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Intake API server received shutdown signal");
        };

        tracing::info!(%addr, "Intake API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Intake API server error: {e}");
        }

        tracing::info!("Intake API server stopped");
    });

    let sweeper_task = spawn_session_sweeper(
        core,
        Duration::from_secs(SWEEP_INTERVAL_SECS),
        Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
    );

    Ok(ApiServer {
        info,
        shutdown_tx: Some(shutdown_tx),
        server_task: Some(server_task),
        sweeper_task,
    })
}

/// Periodically evict sessions idle for longer than `max_idle`.
pub fn spawn_session_sweeper(
    core: Arc<CoreState>,
    every: Duration,
    max_idle: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = core.evict_idle(max_idle) {
                tracing::error!(error = %e, "Session sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{AnalysisInvoker, MockProvider};
    use std::net::{IpAddr, Ipv4Addr};

    fn test_core() -> Arc<CoreState> {
        let provider = Arc::new(MockProvider::replying("{}"));
        Arc::new(CoreState::new(Arc::new(AnalysisInvoker::new(provider, 0)), None))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn start_serve_and_stop() {
        let server = start_api_server(test_core(), loopback())
            .await
            .expect("server should start");
        assert!(server.info.port > 0);
        assert!(!server.info.started_at.is_empty());

        let url = format!("http://127.0.0.1:{}/api/health", server.info.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let url = format!("http://127.0.0.1:{}/nonexistent", server.info.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.stop().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_api_server(test_core(), loopback())
            .await
            .expect("server should start");
        server.shutdown();
        server.shutdown();
    }

    #[tokio::test]
    async fn sweeper_evicts_idle_sessions() {
        let core = test_core();
        core.create_session().unwrap();
        let sweeper =
            spawn_session_sweeper(core.clone(), Duration::from_millis(20), Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(core.session_count().unwrap(), 0);
        sweeper.abort();
    }
}
