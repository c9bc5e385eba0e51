//! Liveness endpoint.
//!
//! `GET /healthz` always answers 200 with a fixed JSON body. It does not touch
//! the template directory and is not counted in the request metrics.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;

use crate::http::request::JSON;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    let body = serde_json::to_vec(&HealthResponse { message: "OK" })
        .unwrap_or_else(|_| br#"{"message":"OK"}"#.to_vec());

    (StatusCode::OK, [(header::CONTENT_TYPE, JSON)], body)
}
