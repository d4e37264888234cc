//! `reqwest`-backed implementation of [`ListingService`].
//!
//! Decoding is kept apart from transport: every `decode_*` function takes the
//! status code and raw body so it can be exercised without a server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{FolderInfo, ListingService};
use crate::browser::model::{EntryKind, FileEntry, SortColumn, SortDirection};
use crate::error::{BrowserError, Result};

const FOLDERS_ENDPOINT: &str = "/api/folders";
const FILES_ENDPOINT: &str = "/api/files";
const CREATE_ENDPOINT: &str = "/api/folders/create";
const RENAME_ENDPOINT: &str = "/api/folders/rename";
const DELETE_ENDPOINT: &str = "/api/folders/delete";
const IS_EMPTY_ENDPOINT: &str = "/api/folders/is-empty";

/// Listing service reached over HTTP with JSON payloads.
pub struct HttpListingService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrowserError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String)> {
        debug!(endpoint, ?query, "GET");
        let response = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        read_body(response).await
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<(StatusCode, String)> {
        debug!(endpoint, %body, "POST");
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        read_body(response).await
    }
}

fn transport_error(err: reqwest::Error) -> BrowserError {
    BrowserError::Transport(err.to_string())
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    Ok((status, body))
}

#[async_trait]
impl ListingService for HttpListingService {
    async fn list_folders(&self, path: Option<&str>) -> Result<Vec<FolderInfo>> {
        let query: Vec<(&str, &str)> = path.map(|p| vec![("path", p)]).unwrap_or_default();
        let (status, body) = self.get(FOLDERS_ENDPOINT, &query).await?;
        decode_folders(status, &body)
    }

    async fn list_files(
        &self,
        path: &str,
        column: SortColumn,
        direction: SortDirection,
    ) -> Result<Vec<FileEntry>> {
        let query = [
            ("path", path),
            ("sortBy", column.as_param()),
            ("sortOrder", direction.as_param()),
        ];
        let (status, body) = self.get(FILES_ENDPOINT, &query).await?;
        decode_files(status, &body)
    }

    async fn create_folder(&self, path: &str, folder_name: &str) -> Result<Option<String>> {
        let (status, body) = self
            .post(CREATE_ENDPOINT, json!({ "path": path, "folderName": folder_name }))
            .await?;
        decode_mutation(status, &body)
    }

    async fn rename_folder(&self, path: &str, new_name: &str) -> Result<Option<String>> {
        let (status, body) = self
            .post(RENAME_ENDPOINT, json!({ "path": path, "newName": new_name }))
            .await?;
        decode_mutation(status, &body)
    }

    async fn delete_folder(&self, path: &str) -> Result<Option<String>> {
        let (status, body) = self.post(DELETE_ENDPOINT, json!({ "path": path })).await?;
        decode_mutation(status, &body)
    }

    async fn check_folder_empty(&self, path: &str) -> Result<bool> {
        let (status, body) = self.get(IS_EMPTY_ENDPOINT, &[("path", path)]).await?;
        decode_empty_check(status, &body)
    }
}

// ── Decoding ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFileItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    mtime: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
}

impl WireFileItem {
    fn into_entry(self) -> FileEntry {
        let kind = match self.kind.as_str() {
            "folder" | "dir" | "directory" => EntryKind::Folder,
            _ => EntryKind::File,
        };
        FileEntry {
            name: self.name,
            path: self.path,
            kind,
            size: if kind == EntryKind::Folder { None } else { self.size },
            modified_at: self.mtime.map(|t| t.trunc() as i64),
            thumbnail_ref: self.image_url,
        }
    }
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

fn body_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Parse a response body, rejecting non-2xx statuses and envelopes that
/// report `error` or `success: false`.
fn envelope(status: StatusCode, body: &str) -> Result<Value> {
    let parsed = parse_body(body);
    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        return Err(BrowserError::Service {
            status: Some(status.as_u16()),
            message,
        });
    }
    let value = parsed?;
    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(BrowserError::service(message));
    }
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body_message(&value).unwrap_or_else(|| "Operation failed".to_string());
        return Err(BrowserError::service(message));
    }
    Ok(value)
}

/// Decode the folder-listing response: a bare array of folders.
pub fn decode_folders(status: StatusCode, body: &str) -> Result<Vec<FolderInfo>> {
    let value = envelope(status, body)?;
    if !value.is_array() {
        return Err(BrowserError::MalformedResponse(format!(
            "expected a folder array, got {}",
            kind_of(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode the file-listing response: `{success, items: [...]}`.
pub fn decode_files(status: StatusCode, body: &str) -> Result<Vec<FileEntry>> {
    let mut value = envelope(status, body)?;
    let items = match value.get_mut("items").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(BrowserError::MalformedResponse(format!(
                "'items' is {}, expected an array",
                kind_of(&other)
            )))
        }
        None => {
            return Err(BrowserError::MalformedResponse(
                "missing 'items' in file listing".into(),
            ))
        }
    };
    let wire: Vec<WireFileItem> = serde_json::from_value(Value::Array(items))?;
    Ok(wire.into_iter().map(WireFileItem::into_entry).collect())
}

/// Decode a create/rename/delete response: `{success, message?}`.
pub fn decode_mutation(status: StatusCode, body: &str) -> Result<Option<String>> {
    let value = envelope(status, body)?;
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(BrowserError::MalformedResponse(
            "missing 'success' in mutation response".into(),
        ));
    }
    Ok(body_message(&value))
}

/// Decode the emptiness check: `{success, isEmpty}`.
pub fn decode_empty_check(status: StatusCode, body: &str) -> Result<bool> {
    let value = envelope(status, body)?;
    value
        .get("isEmpty")
        .and_then(Value::as_bool)
        .ok_or_else(|| BrowserError::MalformedResponse("missing 'isEmpty'".into()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folders_decode_in_order() {
        let body = r#"[
            {"name": "docs", "path": "/docs", "hasSubfolders": true, "icon": "folder"},
            {"name": "pics", "path": "/pics", "hasSubfolders": false, "icon": "folder"}
        ]"#;
        let folders = decode_folders(StatusCode::OK, body).unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0], FolderInfo {
            name: "docs".into(),
            path: "/docs".into(),
            has_subfolders: true,
            icon: Some("folder".into()),
        });
        assert!(!folders[1].has_subfolders);
    }

    #[test]
    fn folders_error_object_is_service_error() {
        let body = r#"{"error": "Path not found"}"#;
        let err = decode_folders(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, BrowserError::Service { status: None, ref message } if message == "Path not found"));
    }

    #[test]
    fn folders_object_without_error_is_malformed() {
        let err = decode_folders(StatusCode::OK, r#"{"folders": []}"#).unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn files_decode_kinds_sizes_and_thumbnails() {
        let body = r#"{"success": true, "items": [
            {"name": "a", "path": "/docs/a", "type": "folder", "size": 4096, "mtime": 1700000000, "icon": "folder"},
            {"name": "b.png", "path": "/docs/b.png", "type": "file", "size": 1234, "mtime": 1700000100.75, "icon": "image", "imageUrl": "/thumbs/b.png"}
        ]}"#;
        let entries = decode_files(StatusCode::OK, body).unwrap();
        assert_eq!(entries[0].kind, EntryKind::Folder);
        assert_eq!(entries[0].size, None);
        assert_eq!(entries[0].modified_at, Some(1_700_000_000));
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].size, Some(1234));
        assert_eq!(entries[1].modified_at, Some(1_700_000_100));
        assert_eq!(entries[1].thumbnail_ref.as_deref(), Some("/thumbs/b.png"));
    }

    #[test]
    fn files_empty_items_is_ok() {
        let entries = decode_files(StatusCode::OK, r#"{"success": true, "items": []}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn files_success_false_is_service_error() {
        let body = r#"{"success": false, "message": "Access denied"}"#;
        let err = decode_files(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.inline_message(), "Access denied");
    }

    #[test]
    fn files_missing_items_is_malformed() {
        let err = decode_files(StatusCode::OK, r#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn files_bad_item_shape_is_malformed() {
        let body = r#"{"success": true, "items": [{"name": 5}]}"#;
        let err = decode_files(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode_files(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, BrowserError::MalformedResponse(_)));
    }

    #[test]
    fn http_error_status_carries_status_and_message() {
        let body = r#"{"success": false, "message": "A folder named 'papers' already exists"}"#;
        let err = decode_mutation(StatusCode::CONFLICT, body).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.inline_message(), "A folder named 'papers' already exists");
    }

    #[test]
    fn http_error_with_html_body_is_still_service_error() {
        let err = decode_files(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, BrowserError::Service { status: Some(502), .. }));
    }

    #[test]
    fn http_error_without_body_uses_reason() {
        let err = decode_mutation(StatusCode::INTERNAL_SERVER_ERROR, "").unwrap_err();
        assert!(matches!(err, BrowserError::Service { status: Some(500), ref message } if message == "Internal Server Error"));
    }

    #[test]
    fn mutation_success_with_and_without_message() {
        let msg = decode_mutation(StatusCode::OK, r#"{"success": true, "message": "Created"}"#).unwrap();
        assert_eq!(msg.as_deref(), Some("Created"));
        let none = decode_mutation(StatusCode::OK, r#"{"success": true}"#).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn empty_check_decodes_flag() {
        assert!(decode_empty_check(StatusCode::OK, r#"{"success": true, "isEmpty": true}"#).unwrap());
        assert!(!decode_empty_check(StatusCode::OK, r#"{"success": true, "isEmpty": false}"#).unwrap());
        assert!(decode_empty_check(StatusCode::OK, r#"{"success": true}"#).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service = HttpListingService::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.url(FILES_ENDPOINT), "http://localhost:8080/api/files");
    }
}
