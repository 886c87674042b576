//! cloud_gallery - Discover images in external storage for gallery imports.
//!
//! This library provides functionality to:
//! - Classify a pasted link or path as Dropbox, Google Drive or local
//! - Normalize it into a stable, provider-addressable form
//! - List the images in that folder behind one [`CloudImage`] shape
//!
//! # Example
//!
//! ```no_run
//! use cloud_gallery::{link_parser, DropboxLister, Gallery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gallery = Gallery::new().with_dropbox(DropboxLister::new("access-token"));
//!
//!     let link = link_parser::parse("https://www.dropbox.com/scl/fo/abc123/h?dl=0")
//!         .ok_or_else(|| anyhow::anyhow!("unsupported link"))?;
//!     for image in gallery.list_images(&link).await? {
//!         println!("{}", image);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod dropbox;
pub mod error;
pub mod gallery;
pub mod gdrive;
pub mod link_parser;
pub mod local;
pub mod models;

// Re-exports for convenience
pub use auth::Authenticator;
pub use config::ListerConfig;
pub use dropbox::DropboxLister;
pub use error::{GalleryError, LinkError, Result};
pub use gallery::Gallery;
pub use gdrive::{GoogleCredentials, GoogleDriveLister};
pub use link_parser::{ParsedLink, Provider};
pub use local::LocalLister;
pub use models::CloudImage;
