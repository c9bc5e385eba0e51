//! Status code → human readable messages.

use axum::http::StatusCode;

/// Standard reason phrase for a numeric code, empty when the code has none.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

/// Messages shown on the page for `code`. Never empty.
pub fn messages(code: u16) -> Vec<String> {
    match code {
        404 => vec!["The page you're looking for could not be found.".to_string()],
        503 => vec![
            "Ooops, this shouldn't have happened.".to_string(),
            "The server is temporary busy, try again later!".to_string(),
        ],
        _ => vec![reason_phrase(code).to_string()],
    }
}
