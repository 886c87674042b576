//! Image listing results and the wire types of the provider APIs.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use feruca::{Collator, Locale, Tailoring};
use serde::{Deserialize, Serialize};

/// File extensions treated as images when the provider gives no MIME type.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic", "bmp", "tiff"];

/// An image discovered in a cloud folder.
///
/// `url` may be a temporary link; do not keep it past the provider's TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudImage {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl std::fmt::Display for CloudImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let dimensions = match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => "-".to_string(),
        };
        write!(f, "{}\t{}\t{}\t{}", self.id, size_str, dimensions, self.name)
    }
}

/// Whether a file name carries one of the [`IMAGE_EXTENSIONS`], ignoring case.
pub fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Best-effort MIME type for an image file name.
pub fn guess_image_mime(name: &str) -> Option<String> {
    mime_guess::from_path(name)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
}

/// Order names with the Unicode Collation Algorithm (root locale), falling
/// back to a byte comparison so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collate(&mut name_collator(), a, b)
}

/// Punctuation stays significant so `img_1` and `img1` never tie.
fn name_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}

fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Sort images ascending by name.
pub fn sort_by_name(images: &mut [CloudImage]) {
    let mut collator = name_collator();
    images.sort_by(|a, b| collate(&mut collator, &a.name, &b.name));
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ---------------------------------------------------------------------------
// Dropbox
// ---------------------------------------------------------------------------

/// One entry of a shared-folder listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DropboxEntry {
    #[serde(rename = ".tag")]
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub server_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media_info: Option<DropboxMediaInfo>,
}

impl DropboxEntry {
    /// The path handed to the temporary-link endpoint.
    pub fn file_ref(&self) -> Option<&str> {
        self.id.as_deref().or(self.path_lower.as_deref())
    }

    /// Dimensions, only when the media info marks the entry as a photo.
    pub fn photo_dimensions(&self) -> Option<DropboxDimensions> {
        match self.media_info.as_ref()? {
            DropboxMediaInfo::Metadata {
                metadata:
                    DropboxMediaMetadata {
                        tag,
                        dimensions: Some(dimensions),
                    },
            } if tag == "photo" => Some(*dimensions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum DropboxMediaInfo {
    Pending,
    Metadata { metadata: DropboxMediaMetadata },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropboxMediaMetadata {
    #[serde(rename = ".tag")]
    pub tag: String,
    #[serde(default)]
    pub dimensions: Option<DropboxDimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DropboxDimensions {
    pub width: u32,
    pub height: u32,
}

/// Response from the shared-link metadata endpoint.
#[derive(Debug, Deserialize)]
pub struct DropboxListResponse {
    #[serde(default)]
    pub entries: Vec<DropboxEntry>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Response from `files/get_temporary_link`.
#[derive(Debug, Deserialize)]
pub struct TemporaryLinkResponse {
    pub link: String,
}

// ---------------------------------------------------------------------------
// Google Drive
// ---------------------------------------------------------------------------

/// Metadata for a file in Google Drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_media_metadata: Option<ImageMediaMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMediaMetadata {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Response from the files.list API endpoint.
///
/// Files stay raw so one bad record can be skipped without losing the page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension("a.jpg"));
        assert!(has_image_extension("B.JPEG"));
        assert!(has_image_extension("scan.tiff"));
        assert!(has_image_extension("x.y.HEIC"));
        assert!(!has_image_extension("notes.pdf"));
        assert!(!has_image_extension("jpg"));
        assert!(!has_image_extension("archive.jpg.zip"));
    }

    #[test]
    fn test_guess_image_mime() {
        assert_eq!(guess_image_mime("a.png").as_deref(), Some("image/png"));
        assert_eq!(guess_image_mime("a.JPG").as_deref(), Some("image/jpeg"));
        assert_eq!(guess_image_mime("a.pdf"), None);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut names = vec!["b.jpg", "A.jpg", "c.jpg", "a.jpg"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(names, vec!["a.jpg", "A.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_sort_by_name_collates_accents_and_punctuation() {
        let mut names = vec!["fall.jpg", "été.jpg", "img1.jpg", "img_1.jpg", "Entrée.jpg"];
        names.sort_by(|a, b| compare_names(a, b));
        assert_eq!(
            names,
            vec!["Entrée.jpg", "été.jpg", "fall.jpg", "img_1.jpg", "img1.jpg"]
        );
    }

    #[test]
    fn test_sort_by_name_on_images() {
        let image = |name: &str| CloudImage {
            id: name.to_string(),
            name: name.to_string(),
            url: format!("https://example.com/{name}"),
            width: None,
            height: None,
            modified_at: None,
            size: None,
            mime_type: None,
        };
        let mut images = vec![image("zoo.jpg"), image("Été.jpg"), image("attic.jpg")];
        sort_by_name(&mut images);
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["attic.jpg", "Été.jpg", "zoo.jpg"]);
    }

    #[test]
    fn test_drive_file_deserialize() {
        let json = r#"{
            "id": "abc123",
            "name": "front.jpg",
            "mimeType": "image/jpeg",
            "size": "2048",
            "modifiedTime": "2024-05-01T10:00:00.000Z",
            "imageMediaMetadata": {"width": 4000, "height": 3000, "rotation": 0}
        }"#;

        let file: DriveFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "abc123");
        assert_eq!(file.size, Some(2048));
        assert!(file.modified_time.is_some());
        let meta = file.image_media_metadata.unwrap();
        assert_eq!(meta.width, Some(4000));
        assert_eq!(meta.height, Some(3000));
    }

    #[test]
    fn test_dropbox_photo_dimensions() {
        let json = r#"{
            ".tag": "file",
            "name": "kitchen.jpg",
            "id": "id:1",
            "size": 10,
            "media_info": {
                ".tag": "metadata",
                "metadata": {".tag": "photo", "dimensions": {"width": 800, "height": 600}}
            }
        }"#;
        let entry: DropboxEntry = serde_json::from_str(json).unwrap();
        assert_eq!(
            entry.photo_dimensions(),
            Some(DropboxDimensions {
                width: 800,
                height: 600
            })
        );

        let json = r#"{
            ".tag": "file",
            "name": "tour.mp4",
            "id": "id:2",
            "media_info": {
                ".tag": "metadata",
                "metadata": {".tag": "video", "dimensions": {"width": 1920, "height": 1080}}
            }
        }"#;
        let entry: DropboxEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.photo_dimensions(), None);

        let json = r#"{".tag": "file", "name": "x.png", "media_info": {".tag": "pending"}}"#;
        let entry: DropboxEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.photo_dimensions(), None);
    }

    #[test]
    fn test_cloud_image_display() {
        let image = CloudImage {
            id: "id:1".to_string(),
            name: "porch.jpg".to_string(),
            url: "https://example.com/porch.jpg".to_string(),
            width: Some(800),
            height: Some(600),
            modified_at: None,
            size: Some(1048576),
            mime_type: Some("image/jpeg".to_string()),
        };

        let display = format!("{}", image);
        assert!(display.contains("porch.jpg"));
        assert!(display.contains("800x600"));
        assert!(display.contains("1.00 MB"));
    }
}
