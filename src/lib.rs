//! Custom Error Pages
//!
//! Default backend for an ingress controller's custom error pages. The proxy
//! forwards failed requests here with `X-Code`, `X-Format` and routing metadata
//! headers; the service answers with a themed HTML page or a JSON document.
//!
//! ```text
//!   Ingress proxy ──▶ http::server ──▶ http::request ──▶ pages::render ──▶ response
//!                         │                                   │
//!                  observability::metrics             pages::templates
//!                  (count + latency)                  (theme dir, per request)
//! ```

pub mod cli;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pages;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
