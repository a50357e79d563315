//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all control handlers
//! - Wire up middleware (tracing, request ID, timeouts, body limit, auth)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::engine::ControlSurface;
use crate::http::auth::require_api_key;
use crate::http::handlers;

/// Control bodies are a handful of integers.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub control: Arc<ControlSurface>,
    pub api_key: Option<Arc<str>>,
}

/// HTTP server for the control API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around `control`.
    pub fn new(control: Arc<ControlSurface>, config: &AppConfig) -> Self {
        let state = AppState {
            control,
            api_key: config.control.api_key.as_deref().map(Arc::from),
        };
        let timeout = Duration::from_secs(config.listener.request_timeout_secs);
        Self {
            router: Self::build_router(state, timeout),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState, timeout: Duration) -> Router {
        let mutating = Router::new()
            .route("/config", post(handlers::update_config))
            .route("/start", post(handlers::start))
            .route("/stop", post(handlers::stop))
            .route("/invoke-once", post(handlers::invoke_once))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

        Router::new()
            .route("/status", get(handlers::get_status))
            .route("/health", get(handlers::health))
            .merge(mutating)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // Oversized bodies are answered with 413 before the timeout applies.
                    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                    .layer(TimeoutLayer::new(timeout)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
