//! Audit logging middleware.
//!
//! Records one structured event per API request on `target: "audit"`:
//! method, path, caller IP, request body, response status, and response
//! body. Password values in request bodies are masked before logging.
//!
//! Both bodies are buffered in full; every payload this API carries is
//! small JSON. Operators can route the audit stream to its own sink via
//! `RUST_LOG` / the tracing `EnvFilter` (e.g. `audit=info`).

use std::net::SocketAddr;

use axum::{
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

/// How much of a non-JSON body the audit line keeps.
const RAW_BODY_LIMIT: usize = 2048;

/// Log a request/response pair to the audit stream.
pub async fn audit_log(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let ip = addr.ip().to_string();

    let (parts, body) = request.into_parts();
    let request_bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let request_body = loggable_body(&request_bytes);
    let request = Request::from_parts(parts, Body::from(request_bytes));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let response_bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let response_body = loggable_body(&response_bytes);

    tracing::info!(
        target: "audit",
        %method,
        %path,
        %ip,
        status = parts.status.as_u16(),
        request = %request_body,
        response = %response_body,
        "api request"
    );

    Response::from_parts(parts, Body::from(response_bytes))
}

/// A body rendered for the audit line: JSON with passwords masked, or a
/// truncated lossy string for anything else. Empty bodies log as `{}`.
fn loggable_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "{}".to_owned();
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut value) => {
            mask_passwords(&mut value);
            value.to_string()
        }
        Err(_) => {
            let text = String::from_utf8_lossy(bytes);
            text.chars().take(RAW_BODY_LIMIT).collect()
        }
    }
}

/// Replace every `password` value, at any depth, with a placeholder.
fn mask_passwords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if key == "password" {
                    *entry = Value::String("[REDACTED]".to_owned());
                } else {
                    mask_passwords(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                mask_passwords(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask_top_level_password() {
        let mut value = json!({"email": "a@b.c", "password": "hunter22222"});
        mask_passwords(&mut value);
        assert_eq!(value["password"], "[REDACTED]");
        assert_eq!(value["email"], "a@b.c");
    }

    #[test]
    fn test_mask_nested_password() {
        let mut value = json!({"payload": [{"password": "deep-secret"}]});
        mask_passwords(&mut value);
        assert_eq!(value["payload"][0]["password"], "[REDACTED]");
    }

    #[test]
    fn test_loggable_body_masks_json() {
        let body = br#"{"password":"top secret!"}"#;
        let logged = loggable_body(body);
        assert!(logged.contains("[REDACTED]"));
        assert!(!logged.contains("top secret!"));
    }

    #[test]
    fn test_loggable_body_empty() {
        assert_eq!(loggable_body(b""), "{}");
    }

    #[test]
    fn test_loggable_body_non_json_truncated() {
        let long = "x".repeat(5000);
        let logged = loggable_body(long.as_bytes());
        assert_eq!(logged.len(), RAW_BODY_LIMIT);
    }
}
