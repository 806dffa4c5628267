//! Image search endpoint
//!
//! The POST body carries a modification-time range; the response is the list
//! of matching Drive image files, each augmented with a direct-download URL
//! computed from its id.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::{Deserialize, Serialize};

use crate::drive::{DriveFile, ImageLister};
use crate::http;
use crate::logger;

/// Template for the download URL; image proxies fetch the binary through
/// this rather than the web view page.
const DIRECT_DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

/// Caller-supplied search window
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub from_timestamp: String,
    #[serde(default)]
    pub to_timestamp: String,
}

/// Response-facing representation of one matching file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: String,
    pub name: String,
    /// Provider-typed passthrough; omitted when Drive did not report one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    pub direct_download_url: String,
}

impl From<DriveFile> for FileSummary {
    fn from(file: DriveFile) -> Self {
        Self {
            direct_download_url: format!("{DIRECT_DOWNLOAD_BASE}{}", file.id),
            id: file.id,
            name: file.name,
            size: file.size,
            web_view_link: file.web_view_link,
        }
    }
}

/// Handle one search request body
///
/// Validation failures answer 400 without touching the lister; lister
/// failures are logged and answer 500 with the error description.
pub async fn handle_search(body: &Bytes, images: &dyn ImageLister) -> Response<Full<Bytes>> {
    let request: SearchRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            return http::build_bad_request_response(&format!("Invalid JSON body: {e}"));
        }
    };

    if let Some(response) = validate(&request) {
        return response;
    }

    match images
        .list_images(&request.from_timestamp, &request.to_timestamp)
        .await
    {
        Ok(files) => {
            let summaries: Vec<FileSummary> = files.into_iter().map(FileSummary::from).collect();
            http::build_json_response(&summaries)
        }
        Err(e) => {
            logger::log_error(&format!("Image search failed: {e}"));
            http::build_server_error_response(&format!("Error processing request: {e}"))
        }
    }
}

/// Reject requests with absent or empty timestamps
fn validate(request: &SearchRequest) -> Option<Response<Full<Bytes>>> {
    let mut missing = Vec::new();
    if request.from_timestamp.is_empty() {
        missing.push("\"fromTimestamp\"");
    }
    if request.to_timestamp.is_empty() {
        missing.push("\"toTimestamp\"");
    }

    if missing.is_empty() {
        None
    } else {
        Some(http::build_bad_request_response(&format!(
            "Missing {} in request body.",
            missing.join(" and ")
        )))
    }
}
