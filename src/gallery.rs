//! Dispatch from a parsed link to the lister for its provider.

use tracing::debug;

use crate::dropbox::DropboxLister;
use crate::error::{GalleryError, Result};
use crate::gdrive::GoogleDriveLister;
use crate::link_parser::{self, ParsedLink, Provider};
use crate::local::LocalLister;
use crate::models::CloudImage;

/// The set of listers available to a gallery import.
///
/// Providers without a configured lister fail with
/// [`GalleryError::ListerNotConfigured`].
#[derive(Default)]
pub struct Gallery {
    dropbox: Option<DropboxLister>,
    gdrive: Option<GoogleDriveLister>,
    local: Option<LocalLister>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dropbox(mut self, lister: DropboxLister) -> Self {
        self.dropbox = Some(lister);
        self
    }

    pub fn with_gdrive(mut self, lister: GoogleDriveLister) -> Self {
        self.gdrive = Some(lister);
        self
    }

    pub fn with_local(mut self, lister: LocalLister) -> Self {
        self.local = Some(lister);
        self
    }

    /// Parse, validate and list in one step.
    ///
    /// An unsupported or malformed link is [`GalleryError::InvalidLink`].
    pub async fn list_url(&self, url: &str) -> Result<Vec<CloudImage>> {
        let link =
            link_parser::parse(url).ok_or_else(|| GalleryError::InvalidLink(url.to_string()))?;
        self.list_images(&link).await
    }

    pub async fn list_images(&self, link: &ParsedLink) -> Result<Vec<CloudImage>> {
        if !link_parser::validate(link) {
            return Err(GalleryError::InvalidLink(link.original_url.clone()));
        }
        debug!(provider = %link.provider, link = %link.normalized, "listing images");

        match link.provider {
            Provider::Dropbox => self.dropbox()?.list_images(link).await,
            Provider::Gdrive => self.gdrive()?.list_images(link).await,
            Provider::Local => self.local()?.list_images(link).await,
        }
    }

    pub fn clear_cache(&self, link: &ParsedLink) {
        match link.provider {
            Provider::Dropbox => {
                if let Some(lister) = &self.dropbox {
                    lister.clear_cache(link);
                }
            }
            Provider::Gdrive => {
                if let Some(lister) = &self.gdrive {
                    lister.clear_cache(link);
                }
            }
            Provider::Local => {
                if let Some(lister) = &self.local {
                    lister.clear_cache(link);
                }
            }
        }
    }

    pub fn clear_all_cache(&self) {
        if let Some(lister) = &self.dropbox {
            lister.clear_all_cache();
        }
        if let Some(lister) = &self.gdrive {
            lister.clear_all_cache();
        }
        if let Some(lister) = &self.local {
            lister.clear_all_cache();
        }
    }

    fn dropbox(&self) -> Result<&DropboxLister> {
        self.dropbox
            .as_ref()
            .ok_or(GalleryError::ListerNotConfigured(Provider::Dropbox))
    }

    fn gdrive(&self) -> Result<&GoogleDriveLister> {
        self.gdrive
            .as_ref()
            .ok_or(GalleryError::ListerNotConfigured(Provider::Gdrive))
    }

    fn local(&self) -> Result<&LocalLister> {
        self.local
            .as_ref()
            .ok_or(GalleryError::ListerNotConfigured(Provider::Local))
    }
}
