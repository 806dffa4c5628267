//! Drive `files.list` client
//!
//! One authenticated GET per search: filter expression, projection, page size
//! and ordering as query parameters, bearer token from the injected provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::query::FileQuery;
use super::{DriveError, ImageLister, TokenProvider};
use crate::config::DriveConfig;

/// Only the fields the response mapping needs
const LIST_FIELDS: &str = "files(id, name, size, webViewLink)";
const LIST_ORDER: &str = "modifiedTime desc";

/// File metadata as returned by the Drive API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    /// Drive reports size as a decimal string and omits it for some types;
    /// kept exactly as returned
    #[serde(default)]
    pub size: Option<serde_json::Value>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Client for the Drive v3 `files.list` operation
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    endpoint: String,
    page_size: u32,
}

impl DriveClient {
    pub fn new(auth: Arc<dyn TokenProvider>, config: &DriveConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, 1000),
        }
    }
}

#[async_trait]
impl ImageLister for DriveClient {
    async fn list_images(&self, from: &str, to: &str) -> Result<Vec<DriveFile>, DriveError> {
        let token = self.auth.access_token().await?;

        let query = FileQuery::new()
            .mime_type_prefix("image/")
            .modified_between(from, to)
            .build();
        let page_size = self.page_size.to_string();

        let response = self
            .http
            .get(format!("{}/files", self.endpoint))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("pageSize", page_size.as_str()),
                ("orderBy", LIST_ORDER),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::Api { status, body });
        }

        let list: FileList = response.json().await?;
        Ok(list.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_list_decodes_string_size() {
        let list: FileList = serde_json::from_str(
            r#"{"files":[{"id":"a1","name":"cat.png","size":"2048","webViewLink":"https://drive.google.com/file/d/a1/view"}]}"#,
        )
        .expect("valid listing should decode");
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].id, "a1");
        assert_eq!(
            list.files[0].size,
            Some(serde_json::Value::String("2048".to_string()))
        );
    }

    #[test]
    fn test_file_list_decodes_numeric_size() {
        let list: FileList =
            serde_json::from_str(r#"{"files":[{"id":"b2","name":"dog.jpg","size":4096}]}"#)
                .expect("numeric size should decode");
        assert_eq!(list.files[0].size, Some(serde_json::json!(4096)));
        assert!(list.files[0].web_view_link.is_none());
    }

    #[test]
    fn test_file_list_tolerates_missing_files_key() {
        let list: FileList = serde_json::from_str("{}").expect("empty object should decode");
        assert!(list.files.is_empty());
    }
}
