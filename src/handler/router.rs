//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health probes,
//! body collection, and access logging around the search endpoint.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};

use crate::config::AppState;
use crate::handler::search;
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;

/// Main entry point for HTTP request handling
///
/// Generic over the body type so tests can drive it with in-memory bodies.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version()).to_string();
    let referer = header_value(&req, "referer");
    let user_agent = header_value(&req, "user-agent");

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let response = dispatch(req, &state).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), method, path);
        entry.query = query;
        entry.http_version = http_version;
        entry.status = response.status().as_u16();
        entry.body_bytes = response_body_bytes(&response);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route the request to preflight, health, or search handling
async fn dispatch<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    match req.method() {
        // CORS preflight, answered on any path
        &Method::OPTIONS => return http::build_preflight_response(),
        &Method::GET => {
            let health = &state.config.health;
            let path = req.uri().path();
            if health.enabled
                && (path == health.liveness_path || path == health.readiness_path)
            {
                return http::build_health_response("ok");
            }
            logger::log_warning(&format!("Method not allowed: GET {path}"));
            return http::build_method_not_allowed_response();
        }
        &Method::POST => {}
        method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_method_not_allowed_response();
        }
    }

    // Check declared body size before reading anything
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_bad_request_response("Failed to read request body");
        }
    };

    search::handle_search(&body, state.images.as_ref()).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_payload_too_large_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

fn response_body_bytes(response: &Response<Full<Bytes>>) -> usize {
    response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::drive::{DriveError, DriveFile, ImageLister};
    use async_trait::async_trait;
    use hyper::StatusCode;

    struct EmptyLister;

    #[async_trait]
    impl ImageLister for EmptyLister {
        async fn list_images(&self, _from: &str, _to: &str) -> Result<Vec<DriveFile>, DriveError> {
            Ok(Vec::new())
        }
    }

    fn test_state() -> Arc<AppState> {
        let config =
            Config::load_from("definitely-not-a-real-config").expect("defaults should load");
        Arc::new(AppState::new(config, Arc::new(EmptyLister)))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:4242".parse().expect("valid test address")
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("valid test request")
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collectable body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let response = handle_request(request(Method::OPTIONS, "/", ""), test_state(), peer())
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers().clone();
        assert_eq!(headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(headers["Access-Control-Allow-Methods"], "POST");
        assert_eq!(headers["Access-Control-Allow-Headers"], "Content-Type");
        assert_eq!(headers["Access-Control-Max-Age"], "3600");
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_health_probes() {
        for path in ["/healthz", "/readyz"] {
            let response = handle_request(request(Method::GET, path, ""), test_state(), peer())
                .await
                .expect("infallible");
            assert_eq!(response.status(), StatusCode::OK, "probe {path}");
        }
    }

    #[tokio::test]
    async fn test_disallowed_methods_get_405() {
        for method in [Method::DELETE, Method::PUT, Method::GET] {
            let response = handle_request(
                request(method.clone(), "/anything", ""),
                test_state(),
                peer(),
            )
            .await
            .expect("infallible");
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "method {method}"
            );
            assert_eq!(response.headers()["Allow"], "POST, OPTIONS");
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_before_parsing() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-length", "10000000")
            .body(Full::new(Bytes::new()))
            .expect("valid test request");
        let response = handle_request(req, test_state(), peer())
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_post_reaches_search_endpoint() {
        let body = r#"{"fromTimestamp":"2024-01-01T00:00:00Z","toTimestamp":"2024-02-01T00:00:00Z"}"#;
        let response = handle_request(request(Method::POST, "/", body), test_state(), peer())
            .await
            .expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_cors_header_on_every_response() {
        let requests = vec![
            request(Method::OPTIONS, "/", ""),
            request(Method::GET, "/healthz", ""),
            request(Method::DELETE, "/", ""),
            request(Method::POST, "/", "{}"),
        ];
        for req in requests {
            let label = format!("{} {}", req.method(), req.uri().path());
            let response = handle_request(req, test_state(), peer())
                .await
                .expect("infallible");
            assert_eq!(
                response.headers()["Access-Control-Allow-Origin"], "*",
                "missing CORS header for {label}"
            );
        }
    }
}
