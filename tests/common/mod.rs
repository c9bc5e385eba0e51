//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceExt;

use custom_error_pages::config::ServiceConfig;
use custom_error_pages::http::HttpServer;
use custom_error_pages::lifecycle::Shutdown;
use custom_error_pages::observability::MetricsSink;

/// The theme shipped with the repository.
#[allow(dead_code)]
pub fn knockout_theme() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("themes/knockout")
}

/// Write a minimal theme that prints every field of the page data.
#[allow(dead_code)]
pub fn write_plain_theme(dir: &Path) {
    std::fs::write(dir.join("styles.css"), "p { margin: 0 }").unwrap();
    std::fs::write(
        dir.join("index.html"),
        "<style>{% include \"styles.css\" %}</style>\
         <h1>{{ code }} {{ title }}</h1>\
         {% for m in messages %}<p>{{ m }}</p>{% endfor %}\
         {% if details %}<pre>{{ details.requestId }}</pre>{% endif %}",
    )
    .unwrap();
}

pub fn config_for(template_directory: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.pages.template_directory = template_directory.to_path_buf();
    config
}

/// Metrics sink that remembers every call, keyed by protocol label.
#[derive(Default)]
pub struct RecordingSink {
    counts: Mutex<HashMap<String, u64>>,
    observations: Mutex<Vec<(String, f64)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, proto: &str) -> u64 {
        self.counts.lock().unwrap().get(proto).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().unwrap().values().sum()
    }

    pub fn observations(&self) -> Vec<(String, f64)> {
        self.observations.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn increment_counter(&self, proto: &str) {
        *self.counts.lock().unwrap().entry(proto.to_string()).or_default() += 1;
    }

    fn observe_histogram(&self, proto: &str, seconds: f64) {
        self.observations.lock().unwrap().push((proto.to_string(), seconds));
    }
}

/// Build a router for `config`, recording metrics into the returned sink.
#[allow(dead_code)]
pub fn router(config: ServiceConfig) -> (Router, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let server = HttpServer::new(config, sink.clone());
    (server.router(), sink)
}

/// Send `headers` to `/` through the router.
#[allow(dead_code)]
pub async fn send(router: &Router, headers: &[(&str, &str)]) -> (StatusCode, HeaderMap, Bytes) {
    let mut request = Request::builder().uri("/");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body)
}

/// Start a server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(
    config: ServiceConfig,
    metrics: Arc<dyn MetricsSink>,
) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, metrics);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    (addr, shutdown, handle)
}
