//! Contract of the remote listing/mutation service.
//!
//! The browser core never talks to the network itself; it emits requests that
//! a [`crate::dispatch::Dispatcher`] fulfils through a [`ListingService`].

pub mod http;
pub mod validate;

use async_trait::async_trait;
use serde::Deserialize;

use crate::browser::model::{FileEntry, SortColumn, SortDirection};
use crate::error::Result;

pub use http::HttpListingService;
pub use validate::validate_folder_name;

/// A folder as reported by the folder-listing operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    pub name: String,
    pub path: String,
    /// Hint only; the real child list may turn out empty.
    #[serde(default)]
    pub has_subfolders: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

impl FolderInfo {
    pub fn new(name: impl Into<String>, path: impl Into<String>, has_subfolders: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            has_subfolders,
            icon: None,
        }
    }
}

/// Remote listing and folder-mutation operations.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Subfolders of `path`, or the top-level folders when `path` is `None`.
    async fn list_folders(&self, path: Option<&str>) -> Result<Vec<FolderInfo>>;

    /// Files and folders inside `path`, ordered by the service.
    async fn list_files(
        &self,
        path: &str,
        column: SortColumn,
        direction: SortDirection,
    ) -> Result<Vec<FileEntry>>;

    async fn create_folder(&self, path: &str, folder_name: &str) -> Result<Option<String>>;

    /// Fails with a 409 [`crate::error::BrowserError::Service`] when the name is taken.
    async fn rename_folder(&self, path: &str, new_name: &str) -> Result<Option<String>>;

    async fn delete_folder(&self, path: &str) -> Result<Option<String>>;

    async fn check_folder_empty(&self, path: &str) -> Result<bool>;
}
