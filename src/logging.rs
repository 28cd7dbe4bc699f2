//! Logging for requests to and responses from the remote store.

use reqwest::{Method, StatusCode};

/// Bodies longer than this many bytes are truncated at the `info` level.
pub(crate) const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Replace the value of the top level JSON field `field_name` in `json_text`
/// with asterisks.
///
/// Text that is not a JSON object is returned unchanged.
pub(crate) fn redact_password(json_text: &str, field_name: &str) -> String {
    let Ok(serde_json::Value::Object(mut object)) = serde_json::from_str(json_text) else {
        return json_text.to_string();
    };

    match object.get_mut(field_name) {
        Some(value) => *value = serde_json::Value::from("********"),
        None => return json_text.to_string(),
    }

    serde_json::Value::Object(object).to_string()
}

/// Log an outgoing request.
///
/// Password fields are redacted before anything is logged.
pub(crate) fn log_request(method: &Method, url: &str, body: &str) {
    let body = redact_password(body, "password");

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending request: {method} {url}\nbody: {}...", truncate(&body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Sending request: {method} {url}\nbody: {body:?}");
    }
}

/// Log the response to a request.
pub(crate) fn log_response(method: &Method, url: &str, status: StatusCode, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received response: {method} {url} {status}\nbody: {}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Received response: {method} {url} {status}\nbody: {body:?}");
    }
}

fn truncate(text: &str) -> &str {
    let end = (0..=LOG_BODY_LENGTH_LIMIT.min(text.len()))
        .rev()
        .find(|&index| text.is_char_boundary(index))
        .unwrap_or(0);

    &text[..end]
}
