//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request metrics)
//! - Bind server to listener
//! - Dispatch intercepted requests to the page renderer
//! - Serve `/healthz` and `/metrics`

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::health::healthz;
use crate::http::request::{debug_echo, RequestContext};
use crate::lifecycle::shutdown::signalled;
use crate::observability::metrics::{measure, MetricsSink};
use crate::pages::{RenderError, ResponseRenderer};

/// Content type of the Prometheus text exposition format.
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<ResponseRenderer>,
    pub metrics: Arc<dyn MetricsSink>,
    pub debug_headers: bool,
}

/// HTTP server for the error page backend.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and metrics sink.
    pub fn new(config: ServiceConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        let state = AppState {
            renderer: Arc::new(ResponseRenderer::from_config(&config.pages)),
            metrics,
            debug_headers: config.pages.debug_headers,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let pages = Router::new()
            .route("/", any(error_page))
            .route("/{*path}", any(error_page))
            .route_layer(middleware::from_fn_with_state(
                state.metrics.clone(),
                measure,
            ));

        Router::new()
            .route("/healthz", get(healthz))
            .route("/metrics", get(expose_metrics))
            .merge(pages)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            template_directory = %self.config.pages.template_directory.display(),
            hide_details = self.config.pages.hide_details,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Renders the error page for an intercepted request.
///
/// Template loading is blocking file I/O, so rendering runs on the blocking pool.
async fn error_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = RequestContext::from_headers(&headers);

    let renderer = state.renderer.clone();
    let task_ctx = ctx.clone();
    let page = match tokio::task::spawn_blocking(move || renderer.render(&task_ctx)).await {
        Ok(page) => page,
        Err(e) => state.renderer.internal_error(&ctx, RenderError::Aborted(e)),
    };

    let mut response = page.into_response();
    if state.debug_headers {
        let out = response.headers_mut();
        for (name, value) in debug_echo(&headers).iter() {
            if !out.contains_key(name) {
                out.insert(name.clone(), value.clone());
            }
        }
    }
    response
}

async fn expose_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Some(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            text,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
