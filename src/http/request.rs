//! Request context extraction.
//!
//! # Responsibilities
//! - Read the headers the ingress controller attaches to a failed request
//! - Negotiate the response format (`X-Format`)
//! - Resolve the status code to answer with (`X-Code`)
//! - Collect the routing metadata echoed in the page details
//!
//! # Design Decisions
//! - Extraction never fails: malformed input degrades to defaults
//! - Only the first value of a repeated header is considered
//! - Header bytes are taken verbatim; invalid UTF-8 is replaced, never dropped

use std::borrow::Cow;

use axum::http::{header, HeaderMap, HeaderName, StatusCode};

use crate::pages::data::ErrorPageDetails;

/// Desired response media type, comma separated list.
pub const X_FORMAT: HeaderName = HeaderName::from_static("x-format");
/// Status code of the failed upstream request.
pub const X_CODE: HeaderName = HeaderName::from_static("x-code");
/// Original URL as seen by the proxy.
pub const X_ORIGINAL_URI: HeaderName = HeaderName::from_static("x-original-uri");
/// Namespace of the matched Ingress.
pub const X_NAMESPACE: HeaderName = HeaderName::from_static("x-namespace");
/// Name of the matched Ingress.
pub const X_INGRESS_NAME: HeaderName = HeaderName::from_static("x-ingress-name");
/// Service the Ingress routed to.
pub const X_SERVICE_NAME: HeaderName = HeaderName::from_static("x-service-name");
/// Port of that Service.
pub const X_SERVICE_PORT: HeaderName = HeaderName::from_static("x-service-port");
/// Request ID shared with the backend service.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub const JSON: &str = "application/json";
pub const HTML: &str = "text/html";

/// Status used when `X-Code` is missing or malformed.
pub const DEFAULT_STATUS: StatusCode = StatusCode::NOT_FOUND;

/// Headers copied onto the response in debug mode.
const DEBUG_ECHO: [HeaderName; 9] = [
    X_FORMAT,
    X_CODE,
    header::CONTENT_TYPE,
    X_ORIGINAL_URI,
    X_NAMESPACE,
    X_INGRESS_NAME,
    X_SERVICE_NAME,
    X_SERVICE_PORT,
    X_REQUEST_ID,
];

/// Output format of an error page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Html,
    Json,
}

impl ResponseFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ResponseFormat::Html => HTML,
            ResponseFormat::Json => JSON,
        }
    }
}

/// Everything the renderer needs from one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    format: ResponseFormat,
    code: String,
    status: StatusCode,
    details: ErrorPageDetails,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            format: get_format(headers),
            code: header_str(headers, &X_CODE).into_owned(),
            status: get_status_code(headers),
            details: ErrorPageDetails {
                original_uri: header_str(headers, &X_ORIGINAL_URI).into_owned(),
                namespace: header_str(headers, &X_NAMESPACE).into_owned(),
                ingress_name: header_str(headers, &X_INGRESS_NAME).into_owned(),
                service_name: header_str(headers, &X_SERVICE_NAME).into_owned(),
                service_port: header_str(headers, &X_SERVICE_PORT).into_owned(),
                request_id: header_str(headers, &X_REQUEST_ID).into_owned(),
            },
        }
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// The literal `X-Code` value, possibly empty or non-numeric.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The status the response is sent with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn details(&self) -> &ErrorPageDetails {
        &self.details
    }
}

/// First value of `name`, empty when absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Cow<'a, str> {
    match headers.get(name) {
        Some(value) => String::from_utf8_lossy(value.as_bytes()),
        None => Cow::Borrowed(""),
    }
}

/// JSON if any comma separated `X-Format` token is exactly `application/json`,
/// HTML otherwise. Tokens are not trimmed.
pub fn get_format(headers: &HeaderMap) -> ResponseFormat {
    let wants_json = header_str(headers, &X_FORMAT)
        .split(',')
        .any(|token| token == JSON);

    if wants_json {
        ResponseFormat::Json
    } else {
        ResponseFormat::Html
    }
}

/// The status code from `X-Code`, or 404 when it is not a valid status.
pub fn get_status_code(headers: &HeaderMap) -> StatusCode {
    let raw = header_str(headers, &X_CODE);
    let raw = raw.as_ref();
    match raw.parse::<u16>().map(StatusCode::from_u16) {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            tracing::debug!(code = raw, error = %e, default = %DEFAULT_STATUS, "Unexpected return code");
            DEFAULT_STATUS
        }
        Err(e) => {
            tracing::debug!(code = raw, error = %e, default = %DEFAULT_STATUS, "Unexpected return code");
            DEFAULT_STATUS
        }
    }
}

/// Copies of the inbound proxy headers, for echoing in debug mode.
pub fn debug_echo(headers: &HeaderMap) -> HeaderMap {
    let mut echo = HeaderMap::new();
    for name in DEBUG_ECHO {
        if let Some(value) = headers.get(&name) {
            echo.insert(name, value.clone());
        }
    }
    echo
}
