//! HTTP response building module
//!
//! Provides builders for every response the service sends. The endpoint is
//! called from browsers, so every builder carries the permissive CORS origin
//! header, error responses included.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Build 204 preflight response for CORS OPTIONS requests
///
/// Advertises the one cross-origin operation this service supports and lets
/// browsers cache the answer for an hour.
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", "3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("preflight", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 JSON response from a serializable body
pub fn build_json_response<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_server_error_response("Failed to serialize response");
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::from("[]")))
        })
}

/// Build 400 Bad Request response with a plain-text reason
pub fn build_bad_request_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_text(StatusCode::BAD_REQUEST, message, "400")
}

/// Build 500 Internal Server Error response with a plain-text reason
pub fn build_server_error_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_text(StatusCode::INTERNAL_SERVER_ERROR, message, "500")
}

/// Build 405 Method Not Allowed response
pub fn build_method_not_allowed_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "POST, OPTIONS")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build 413 Payload Too Large response
pub fn build_payload_too_large_response() -> Response<Full<Bytes>> {
    build_plain_text(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large",
        "413",
    )
}

/// Build health probe response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    build_plain_text(StatusCode::OK, status, "health")
}

fn build_plain_text(status: StatusCode, message: &str, label: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(message.to_string())))
        .unwrap_or_else(|e| {
            log_build_error(label, &e);
            Response::new(Full::new(Bytes::from(message.to_string())))
        })
}

/// Log response build error
fn log_build_error(label: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {label} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(response: &'a Response<Full<Bytes>>, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_preflight_headers() {
        let response = build_preflight_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            header(&response, "Access-Control-Allow-Methods"),
            Some("POST")
        );
        assert_eq!(
            header(&response, "Access-Control-Allow-Headers"),
            Some("Content-Type")
        );
        assert_eq!(header(&response, "Access-Control-Max-Age"), Some("3600"));
    }

    #[test]
    fn test_cors_present_on_error_responses() {
        for response in [
            build_bad_request_response("nope"),
            build_server_error_response("boom"),
            build_method_not_allowed_response(),
            build_payload_too_large_response(),
            build_health_response("ok"),
        ] {
            assert_eq!(
                header(&response, "Access-Control-Allow-Origin"),
                Some("*"),
                "missing CORS header on {}",
                response.status()
            );
        }
    }

    #[test]
    fn test_method_not_allowed_advertises_allowed_methods() {
        let response = build_method_not_allowed_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&response, "Allow"), Some("POST, OPTIONS"));
    }

    #[test]
    fn test_json_response_serializes_body() {
        let response = build_json_response(&vec!["a", "b"]);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "Content-Type"), Some("application/json"));
    }
}
