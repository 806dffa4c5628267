//! HTTP protocol layer module
//!
//! Response construction, decoupled from specific business logic.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_bad_request_response, build_health_response, build_json_response,
    build_method_not_allowed_response, build_payload_too_large_response,
    build_preflight_response, build_server_error_response,
};
