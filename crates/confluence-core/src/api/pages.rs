//! Page operations on top of `AuthenticatedClient`.
//!
//! Each operation encodes one request shape and one post-processing step.
//! None of them loop over result pages; callers advance `offset` themselves.

use reqwest::header::HeaderMap;
use reqwest::Method;
use tracing::{info, warn};

use super::client::AuthenticatedClient;
use super::executor::ApiResponse;
use super::query::{lastmodified_cql, Comparison, Query};
use super::ApiError;
use crate::models::{ContentList, Page, PageUpdate, DEFAULT_VERSION_MESSAGE};

const CONTENT_PATH: &str = "/wiki/rest/api/content";
const SEARCH_PATH: &str = "/wiki/rest/api/content/search";

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

pub struct Pages<'a> {
    client: &'a AuthenticatedClient,
    expand: &'a [String],
}

impl<'a> Pages<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient, expand: &'a [String]) -> Self {
        Self { client, expand }
    }

    /// Fetch a single page by id.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Page, ApiError> {
        let path = Query::new()
            .push("type", "page")
            .push("id", id)
            .expand(self.expand)
            .to_path(CONTENT_PATH);

        let list: ContentList = self.client.get(&path).await?.json()?;
        list.results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    /// One page of current pages, optionally restricted to a space.
    pub async fn fetch_all(&self, space_key: Option<&str>, offset: u32, limit: u32) -> Result<Vec<Page>, ApiError> {
        let path = Query::new()
            .push("type", "page")
            .push_opt("spaceKey", space_key)
            .push("status", "current")
            .expand(self.expand)
            .push("start", offset)
            .push("limit", limit)
            .to_path(CONTENT_PATH);

        let list: ContentList = self.client.get(&path).await?.json()?;
        Ok(list.results)
    }

    /// Pages whose last-modified date compares to `date` as `comparison` says.
    pub async fn fetch_updated_since(&self, date: &str, comparison: Comparison) -> Result<Vec<Page>, ApiError> {
        let cql = lastmodified_cql(date, comparison)?;
        let path = Query::new()
            .push("cql", cql)
            .expand(self.expand)
            .to_path(SEARCH_PATH);

        let list: ContentList = self.client.get(&path).await?.json()?;
        Ok(list.results)
    }

    pub async fn update(&self, id: &str, title: &str, body: &str) -> Result<Page, ApiError> {
        self.update_with_message(id, title, body, DEFAULT_VERSION_MESSAGE).await
    }

    /// Read-modify-write: fetch the current version and submit version + 1.
    ///
    /// A concurrent writer can still win the race; the server's rejection
    /// comes back as `RequestFailed`.
    pub async fn update_with_message(
        &self,
        id: &str,
        title: &str,
        body: &str,
        message: &str,
    ) -> Result<Page, ApiError> {
        let current = self.fetch_by_id(id).await?;
        let version = current
            .version_number()
            .ok_or_else(|| ApiError::VersionMissing(id.to_string()))?;

        let update = PageUpdate::next_version(id, title, body, version, message);
        let payload = serde_json::to_value(&update)
            .map_err(|e| ApiError::InvalidRequest(format!("failed to encode page update: {}", e)))?;

        let path = format!("{}/{}", CONTENT_PATH, urlencoding::encode(id));
        let page: Page = self
            .client
            .call(&path, Method::PUT, Some(&payload), &HeaderMap::new())
            .await?
            .json()?;

        info!(id = id, version = update.version.number, "Page updated");
        Ok(page)
    }

    /// Delete a page. Any non-2xx, including 404 for an already deleted
    /// page, is returned as an error.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", CONTENT_PATH, urlencoding::encode(id));
        let response = self
            .client
            .call(&path, Method::DELETE, None, &HeaderMap::new())
            .await?;

        if !matches!(response, ApiResponse::NoContent) {
            warn!(id = id, "Delete succeeded without a 204 response");
        }
        info!(id = id, "Page deleted");
        Ok(())
    }
}
