//! Error page rendering subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (http/request.rs)
//!     → catalog.rs (status code → title + messages)
//!     → templates.rs (load theme from disk, HTML only)
//!     → render.rs (build ErrorPageData, execute or serialize)
//!     → RenderedPage written by the HTTP handler
//! ```

pub mod catalog;
pub mod data;
pub mod render;
pub mod templates;

pub use data::{ErrorPageData, ErrorPageDetails};
pub use render::{RenderError, RenderedPage, ResponseRenderer};
pub use templates::{TemplateError, TemplateResolver, TemplateSet};
