//! Image listing for Google Drive folders.

use reqwest::{Client, RequestBuilder};
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::cache::ImageCache;
use crate::config::ListerConfig;
use crate::error::{GalleryError, Result};
use crate::link_parser::{ensure_listable, ParsedLink, Provider};
use crate::models::{
    has_image_extension, sort_by_name, ApiErrorResponse, CloudImage, DriveFile, FileListResponse,
};

/// Fields requested for every listed file.
const LIST_FIELDS: &str =
    "nextPageToken, files(id, name, mimeType, size, modifiedTime, imageMediaMetadata)";

/// Files returned per page.
const PAGE_SIZE: &str = "1000";

/// Credentials for the Drive API. Both may be set; the service account is
/// tried first.
#[derive(Debug, Clone, Default)]
pub struct GoogleCredentials {
    pub service_account: Option<Authenticator>,
    pub api_key: Option<String>,
}

impl GoogleCredentials {
    pub fn service_account(auth: Authenticator) -> Self {
        Self {
            service_account: Some(auth),
            api_key: None,
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            service_account: None,
            api_key: Some(key.into()),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// How a single listing authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DriveAuth {
    Bearer(String),
    ApiKey(String),
    Anonymous,
}

impl DriveAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            DriveAuth::Bearer(token) => request.bearer_auth(token),
            DriveAuth::ApiKey(key) => request.query(&[("key", key)]),
            DriveAuth::Anonymous => request,
        }
    }
}

/// Lists the images in a Google Drive folder.
pub struct GoogleDriveLister {
    credentials: GoogleCredentials,
    http: Client,
    cache: ImageCache,
    config: ListerConfig,
}

impl GoogleDriveLister {
    pub fn new(credentials: GoogleCredentials) -> Self {
        Self::with_config(credentials, ListerConfig::default())
    }

    pub fn with_config(mut credentials: GoogleCredentials, config: ListerConfig) -> Self {
        let http = config.http_client();
        // Token exchanges share the listing timeout.
        credentials.service_account = credentials
            .service_account
            .map(|auth| auth.with_client(http.clone()));
        Self {
            credentials,
            http,
            cache: ImageCache::new(config.cache_ttl),
            config,
        }
    }

    fn cache_key(link: &ParsedLink) -> String {
        format!("gdrive:{}", link.id)
    }

    /// List every image in the folder, sorted by name.
    ///
    /// Served from cache when the same folder was listed within the TTL.
    /// Files whose metadata cannot be read are skipped; any failed page
    /// request fails the call.
    pub async fn list_images(&self, link: &ParsedLink) -> Result<Vec<CloudImage>> {
        ensure_listable(link, Provider::Gdrive)?;

        let key = Self::cache_key(link);
        if let Some(images) = self.cache.get(&key) {
            return Ok(images);
        }

        let files = self.list_folder(&link.id).await?;
        let found = files.len();

        let mut images = Vec::with_capacity(found);
        for raw in files {
            let file: DriveFile = match serde_json::from_value(raw) {
                Ok(file) => file,
                Err(e) => {
                    warn!(error = %e, "skipping drive file with unreadable metadata");
                    continue;
                }
            };
            if !is_image(&file) {
                debug!(name = %file.name, mime_type = ?file.mime_type, "skipping non-image drive file");
                continue;
            }
            images.push(self.to_cloud_image(file));
        }
        sort_by_name(&mut images);

        info!(
            folder_id = %link.id,
            found,
            listed = images.len(),
            "listed drive folder"
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

    /// Service account first, then API key, then no credentials at all.
    async fn resolve_auth(&self) -> DriveAuth {
        if let Some(auth) = &self.credentials.service_account {
            match auth.get_access_token().await {
                Ok(token) => return DriveAuth::Bearer(token),
                Err(e) => {
                    warn!(
                        client_email = %auth.client_email(),
                        error = %e,
                        "service account token exchange failed"
                    );
                }
            }
        }

        match &self.credentials.api_key {
            Some(key) => DriveAuth::ApiKey(key.clone()),
            None => {
                warn!("no usable Google credentials, listing unauthenticated");
                DriveAuth::Anonymous
            }
        }
    }

    /// Fetch the raw file records of every page of the folder.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<serde_json::Value>> {
        let auth = self.resolve_auth().await;
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            folder_id.replace('\'', "\\'")
        );

        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/drive/v3/files", self.config.google_api_base))
                .query(&[
                    ("q", query.as_str()),
                    ("fields", LIST_FIELDS),
                    ("orderBy", "name"),
                    ("pageSize", PAGE_SIZE),
                    ("supportsAllDrives", "true"),
                    ("includeItemsFromAllDrives", "true"),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = auth.apply(request).send().await?;
            let status = response.status();

            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_default();
                let message = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
                    Ok(api_error) => api_error.error.message,
                    Err(_) => error_body,
                };
                return Err(GalleryError::ApiError {
                    status: status.as_u16(),
                    message,
                });
            }

            let list_response: FileListResponse = response.json().await?;
            debug!(count = list_response.files.len(), "fetched drive page");
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => {
                    page_token = Some(token);
                    tokio::time::sleep(self.config.page_delay).await;
                }
                None => break,
            }
        }

        Ok(all_files)
    }

    fn to_cloud_image(&self, file: DriveFile) -> CloudImage {
        let url = self.view_url(&file.id);
        let (width, height) = file
            .image_media_metadata
            .map_or((None, None), |meta| (meta.width, meta.height));

        CloudImage {
            id: file.id,
            name: file.name,
            url,
            width,
            height,
            modified_at: file.modified_time,
            size: file.size,
            mime_type: file.mime_type,
        }
    }

    /// Directly fetchable with an API key. Without one, the generic viewer
    /// URL is returned, which needs further authentication for private files.
    fn view_url(&self, file_id: &str) -> String {
        match &self.credentials.api_key {
            Some(key) => format!(
                "{}/drive/v3/files/{}?alt=media&key={}",
                self.config.google_api_base, file_id, key
            ),
            None => format!("https://drive.google.com/uc?id={}", file_id),
        }
    }
}

fn is_image(file: &DriveFile) -> bool {
    match file.mime_type.as_deref() {
        Some(mime) => mime.starts_with("image/"),
        None => has_image_extension(&file.name),
    }
}
