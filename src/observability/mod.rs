//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Error page handler
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → stdout
//!     → /metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics are labeled by HTTP protocol version only
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::{measure, MetricsSink, NoopSink, PrometheusSink};
