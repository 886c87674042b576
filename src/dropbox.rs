//! Image listing for Dropbox shared folders.

use std::collections::HashSet;

use futures::{future, stream, StreamExt};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cache::ImageCache;
use crate::config::ListerConfig;
use crate::error::{GalleryError, Result};
use crate::link_parser::{ensure_listable, ParsedLink, Provider};
use crate::models::{
    guess_image_mime, has_image_extension, sort_by_name, CloudImage, DropboxEntry,
    DropboxListResponse, TemporaryLinkResponse,
};

/// Lists the images in a Dropbox shared folder.
///
/// Each image gets a temporary direct-download link, valid for a few hours.
pub struct DropboxLister {
    access_token: String,
    http: Client,
    cache: ImageCache,
    config: ListerConfig,
}

impl DropboxLister {
    /// Create a lister that authenticates with a bearer access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_config(access_token, ListerConfig::default())
    }

    pub fn with_config(access_token: impl Into<String>, config: ListerConfig) -> Self {
        Self {
            access_token: access_token.into(),
            http: config.http_client(),
            cache: ImageCache::new(config.cache_ttl),
            config,
        }
    }

    fn cache_key(link: &ParsedLink) -> String {
        format!("dropbox:{}", link.normalized)
    }

    /// List every image in the shared folder, sorted by name.
    ///
    /// Served from cache when the same folder was listed within the TTL.
    /// A failed temporary link drops that one image; a failed listing
    /// request fails the call.
    pub async fn list_images(&self, link: &ParsedLink) -> Result<Vec<CloudImage>> {
        ensure_listable(link, Provider::Dropbox)?;

        let key = Self::cache_key(link);
        if let Some(images) = self.cache.get(&key) {
            return Ok(images);
        }

        let entries = self.list_entries(&link.normalized).await?;
        let found = entries.len();
        let mut images = self.resolve_entries(entries).await;
        sort_by_name(&mut images);

        info!(
            link = %link.normalized,
            found,
            listed = images.len(),
            "listed dropbox folder"
        );

        self.cache.insert(key, images.clone());
        Ok(images)
    }

    /// Drop the cached listing for one folder.
    pub fn clear_cache(&self, link: &ParsedLink) {
        self.cache.remove(&Self::cache_key(link));
    }

    pub fn clear_all_cache(&self) {
        self.cache.clear();
    }

    /// Walk every page of the folder, keeping unique image files.
    async fn list_entries(&self, shared_link: &str) -> Result<Vec<DropboxEntry>> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(shared_link, cursor.as_deref()).await?;
            debug!(count = page.entries.len(), has_more = page.has_more, "fetched dropbox page");

            for entry in page.entries {
                if entry.tag != "file" || !has_image_extension(&entry.name) {
                    continue;
                }
                let Some(file_ref) = entry.file_ref() else {
                    warn!(name = %entry.name, "skipping dropbox entry without id or path");
                    continue;
                };
                if seen.insert(file_ref.to_string()) {
                    entries.push(entry);
                }
            }

            match page.cursor {
                Some(next) if page.has_more => {
                    cursor = Some(next);
                    tokio::time::sleep(self.config.page_delay).await;
                }
                _ => break,
            }
        }

        Ok(entries)
    }

    async fn fetch_page(
        &self,
        shared_link: &str,
        cursor: Option<&str>,
    ) -> Result<DropboxListResponse> {
        let mut request = self
            .http
            .get(format!("{}/1/metadata/auto", self.config.dropbox_api_base))
            .bearer_auth(&self.access_token)
            .query(&[("path", shared_link), ("list", "true")]);

        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GalleryError::ApiError {
                status: status.as_u16(),
                message: error_body,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch temporary links with bounded concurrency, skipping failures.
    async fn resolve_entries(&self, entries: Vec<DropboxEntry>) -> Vec<CloudImage> {
        stream::iter(entries)
            .map(|entry| async move {
                match self.to_cloud_image(&entry).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        warn!(name = %entry.name, error = %e, "skipping image without temporary link");
                        None
                    }
                }
            })
            .buffer_unordered(self.config.link_concurrency)
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn to_cloud_image(&self, entry: &DropboxEntry) -> Result<CloudImage> {
        let file_ref = entry.file_ref().unwrap_or(&entry.name);
        let url = self.temporary_link(file_ref).await?;
        let dimensions = entry.photo_dimensions();

        Ok(CloudImage {
            id: file_ref.to_string(),
            name: entry.name.clone(),
            url,
            width: dimensions.map(|d| d.width),
            height: dimensions.map(|d| d.height),
            modified_at: entry.server_modified,
            size: entry.size,
            mime_type: guess_image_mime(&entry.name),
        })
    }

    async fn temporary_link(&self, path: &str) -> Result<String> {
        let response = self
            .http
            .post(format!(
                "{}/2/files/get_temporary_link",
                self.config.dropbox_api_base
            ))
            .bearer_auth(&self.access_token)
            .json(&json!({ "path": path }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GalleryError::ApiError {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let link: TemporaryLinkResponse = response.json().await?;
        Ok(link.link)
    }
}
