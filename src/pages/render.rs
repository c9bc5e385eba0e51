//! Error page rendering.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → format branch
//!         JSON: catalog + serde_json
//!         HTML: catalog + TemplateResolver + TemplateSet::execute
//!     → RenderedPage (status, content type, fully buffered body)
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered completely before anything is written, so a late
//!   failure can still turn into a clean 500
//! - Every failure ends as a JSON 500 describing the failing stage; nothing
//!   propagates past the renderer

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::PagesConfig;
use crate::http::request::{RequestContext, ResponseFormat};
use crate::pages::catalog;
use crate::pages::data::ErrorPageData;
use crate::pages::templates::{TemplateError, TemplateResolver};

/// First message line of every internal failure page.
pub const FAILURE_HEADLINE: &str = "Ups, this should not have happened";

/// Used only if the failure page itself cannot be serialized.
const LAST_RESORT_BODY: &[u8] =
    br#"{"code":"500","title":"Internal Server Error","messages":["Ups, this should not have happened"]}"#;

/// A stage of the pipeline that failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse templates: {0}")]
    Parse(#[source] TemplateError),

    #[error("failed to execute templates: {0}")]
    Execute(#[source] tera::Error),

    #[error("failed to marshal json response: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("render task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl RenderError {
    /// Client-facing description of the failed stage.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            RenderError::Parse(_) => "Failed to parse templates",
            RenderError::Execute(_) | RenderError::Aborted(_) => "Failed to execute templates",
            RenderError::Marshal(_) => "Failed to marshal json response",
        }
    }
}

/// A finished response, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub status: StatusCode,
    pub format: ResponseFormat,
    pub body: Vec<u8>,
}

impl IntoResponse for RenderedPage {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.format.content_type())],
            self.body,
        )
            .into_response()
    }
}

/// Turns a [`RequestContext`] into an HTML or JSON error page.
#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    resolver: TemplateResolver,
    hide_details: bool,
}

impl ResponseRenderer {
    pub fn new(resolver: TemplateResolver, hide_details: bool) -> Self {
        Self {
            resolver,
            hide_details,
        }
    }

    pub fn from_config(config: &PagesConfig) -> Self {
        Self::new(TemplateResolver::from_config(config), config.hide_details)
    }

    /// Dispatch on the negotiated format.
    pub fn render(&self, ctx: &RequestContext) -> RenderedPage {
        match ctx.format() {
            ResponseFormat::Json => self.json_response(ctx),
            ResponseFormat::Html => self.html_response(ctx),
        }
    }

    pub fn html_response(&self, ctx: &RequestContext) -> RenderedPage {
        let status = ctx.status();

        let templates = match self.resolver.resolve(status.as_u16()) {
            Ok(templates) => templates,
            Err(e @ TemplateError::NoPageForCode { .. }) => {
                tracing::warn!(error = %e, "No custom page, answering with JSON");
                return self.json_response(ctx);
            }
            Err(e) => return self.internal_error(ctx, RenderError::Parse(e)),
        };

        let data = self.page_data(ctx, ctx.code().to_string(), status);
        match templates.execute(&data) {
            Ok(body) => {
                tracing::debug!(
                    code = %status,
                    directory = %self.resolver.directory().display(),
                    template = templates.entry().unwrap_or_default(),
                    "Serving custom error page"
                );
                RenderedPage {
                    status,
                    format: ResponseFormat::Html,
                    body: body.into_bytes(),
                }
            }
            Err(e) => self.internal_error(ctx, RenderError::Execute(e)),
        }
    }

    pub fn json_response(&self, ctx: &RequestContext) -> RenderedPage {
        let status = ctx.status();
        let data = self.page_data(ctx, ctx.code().to_string(), status);

        match serde_json::to_vec(&data) {
            Ok(body) => RenderedPage {
                status,
                format: ResponseFormat::Json,
                body,
            },
            Err(e) => self.internal_error(ctx, RenderError::Marshal(e)),
        }
    }

    /// JSON 500 page naming the stage that failed.
    pub fn internal_error(&self, ctx: &RequestContext, error: RenderError) -> RenderedPage {
        tracing::error!(error = %error, request_id = %ctx.details().request_id, "{}", error.diagnostic());

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let mut data = self.page_data(ctx, status.as_u16().to_string(), status);
        data.messages = vec![FAILURE_HEADLINE.to_string(), error.diagnostic().to_string()];

        let body = serde_json::to_vec(&data).unwrap_or_else(|_| LAST_RESORT_BODY.to_vec());
        RenderedPage {
            status,
            format: ResponseFormat::Json,
            body,
        }
    }

    fn page_data(&self, ctx: &RequestContext, code: String, status: StatusCode) -> ErrorPageData {
        let number = status.as_u16();
        ErrorPageData {
            code,
            title: catalog::reason_phrase(number).to_string(),
            messages: catalog::messages(number),
            details: (!self.hide_details).then(|| ctx.details().clone()),
        }
    }
}
