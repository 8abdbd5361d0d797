use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;

pub mod error;
mod operations;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) dispatcher: Dispatcher,
}

/// HTTP front end for the dispatcher. Stops when dropped.
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    pub async fn start(config: &ServerConfig, dispatcher: Dispatcher) -> Result<Self, String> {
        let listener = TcpListener::bind(config.addr())
            .await
            .map_err(|error| format!("failed to bind {}: {error}", config.addr()))?;
        let addr = listener.local_addr().map_err(|error| error.to_string())?;
        let app = router(dispatcher);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = served {
                tracing::error!("server stopped with error: {error}");
            }
        });

        tracing::info!(%addr, "automation bridge listening");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> Result<(), String> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| "failed to send server shutdown signal".to_string())
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

pub fn router(dispatcher: Dispatcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/rpc", post(operations::rpc))
        .route("/operations", get(operations::list))
        .route("/operations/:name", post(operations::invoke))
        .with_state(ServerState { dispatcher })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}
