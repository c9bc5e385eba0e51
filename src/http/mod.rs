//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, metrics + trace layers)
//!     → request.rs (format, status code, routing metadata from headers)
//!     → pages::render (HTML or JSON body)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestContext, ResponseFormat};
pub use server::{AppState, HttpServer};
