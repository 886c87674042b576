//! Image listing for folders on the local filesystem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cache::ImageCache;
use crate::config::ListerConfig;
use crate::error::{GalleryError, Result};
use crate::link_parser::{ensure_listable, ParsedLink, Provider};
use crate::models::{guess_image_mime, has_image_extension, sort_by_name, CloudImage};

/// Lists the images under a local directory, recursively.
///
/// Image `url`s are absolute file paths; serving them is up to the caller.
pub struct LocalLister {
    cache: ImageCache,
}

impl Default for LocalLister {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLister {
    pub fn new() -> Self {
        Self::with_config(&ListerConfig::default())
    }

    pub fn with_config(config: &ListerConfig) -> Self {
        Self {
            cache: ImageCache::new(config.cache_ttl),
        }
    }

    fn cache_key(link: &ParsedLink) -> String {
        format!("local:{}", link.normalized)
    }

    /// List every image below the folder, sorted by path relative to it.
    pub async fn list_images(&self, link: &ParsedLink) -> Result<Vec<CloudImage>> {
        ensure_listable(link, Provider::Local)?;

        let key = Self::cache_key(link);
        if let Some(images) = self.cache.get(&key) {
            return Ok(images);
        }

        let root = PathBuf::from(&link.normalized);
        let mut images = tokio::task::spawn_blocking(move || scan_folder(&root))
            .await
            .map_err(|e| GalleryError::LocalScan(format!("scan task failed: {e}")))??;
        sort_by_name(&mut images);

        info!(path = %link.normalized, listed = images.len(), "listed local folder");

        self.cache.insert(key, images.clone());
        Ok(images)
    }

    pub fn clear_cache(&self, link: &ParsedLink) {
        self.cache.remove(&Self::cache_key(link));
    }

    pub fn clear_all_cache(&self) {
        self.cache.clear();
    }
}

fn scan_folder(root: &Path) -> Result<Vec<CloudImage>> {
    if !root.is_dir() {
        return Err(GalleryError::LocalScan(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable local entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !has_image_extension(&file_name) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let path = entry.path().to_string_lossy().into_owned();
        let metadata = entry.metadata().ok();

        images.push(CloudImage {
            id: path.clone(),
            mime_type: guess_image_mime(&file_name),
            name,
            url: path,
            width: None,
            height: None,
            modified_at: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            size: metadata.map(|m| m.len()),
        });
    }

    Ok(images)
}
