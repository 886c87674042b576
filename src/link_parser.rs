//! Classification and normalization of user-supplied gallery links.

use std::env;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GalleryError, LinkError};

const DROPBOX_HOST: &str = "www.dropbox.com";
const DRIVE_HOST: &str = "drive.google.com";

/// Drive folder ids are long opaque tokens; anything shorter is a typo.
const MIN_DRIVE_ID_LEN: usize = 20;

/// Windows drive-letter paths such as `C:\Photos` or `D:/shoots`.
static DRIVE_LETTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]:[\\/]").expect("Invalid drive letter regex"));

/// External storage an image folder can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Dropbox,
    Gdrive,
    Local,
}

/// Presentation details for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderDisplay {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const UNKNOWN_DISPLAY: ProviderDisplay = ProviderDisplay {
    name: "Unknown",
    icon: "cloud",
    color: "#9CA3AF",
};

impl Provider {
    /// The short tag used in cache keys and serialized links.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Dropbox => "dropbox",
            Provider::Gdrive => "gdrive",
            Provider::Local => "local",
        }
    }

    /// Look up a provider by its tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dropbox" => Some(Provider::Dropbox),
            "gdrive" => Some(Provider::Gdrive),
            "local" => Some(Provider::Local),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.display().name
    }

    pub fn display(self) -> ProviderDisplay {
        match self {
            Provider::Dropbox => ProviderDisplay {
                name: "Dropbox",
                icon: "dropbox",
                color: "#0061FF",
            },
            Provider::Gdrive => ProviderDisplay {
                name: "Google Drive",
                icon: "google-drive",
                color: "#4285F4",
            },
            Provider::Local => ProviderDisplay {
                name: "Local Folder",
                icon: "folder",
                color: "#6B7280",
            },
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized, normalized image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLink {
    pub provider: Provider,
    /// Canonical form with volatile query parameters stripped.
    pub normalized: String,
    /// Shared-link segment, Drive folder id, or absolute local path.
    pub id: String,
    /// The input exactly as supplied.
    pub original_url: String,
}

/// Parse a link, collapsing every failure into `None`.
///
/// Callers should treat `None` as "unsupported link". Use [`try_parse`]
/// to tell an unrecognized string apart from a broken link of a known kind.
///
/// Surrounding whitespace is ignored before classification, so a pasted
/// `" /photos\n"` is a local path. `original_url` keeps the untrimmed input.
///
/// # Examples
///
/// ```
/// use cloud_gallery::link_parser::{parse, Provider};
///
/// let link = parse("https://www.dropbox.com/scl/fo/abc123/h?dl=0").unwrap();
/// assert_eq!(link.provider, Provider::Dropbox);
/// assert_eq!(link.id, "abc123");
/// assert_eq!(link.normalized, "https://www.dropbox.com/scl/fo/abc123/h");
///
/// assert!(parse("https://example.com/folder/123").is_none());
/// ```
pub fn parse(original_url: &str) -> Option<ParsedLink> {
    match try_parse(original_url) {
        Ok(link) => Some(link),
        Err(err @ LinkError::Malformed { .. }) => {
            warn!(link = original_url, error = %err, "rejecting malformed link");
            None
        }
        Err(err) => {
            debug!(link = original_url, error = %err, "link not recognized");
            None
        }
    }
}

/// Parse a link, reporting why it was rejected.
pub fn try_parse(original_url: &str) -> Result<ParsedLink, LinkError> {
    let trimmed = original_url.trim();
    if trimmed.is_empty() {
        return Err(LinkError::Empty);
    }

    // Local paths first: Windows paths must not be mistaken for malformed URLs.
    if is_local_path(trimmed) {
        return parse_local(trimmed, original_url);
    }

    let url = Url::parse(trimmed).map_err(|_| LinkError::Unrecognized(original_url.to_string()))?;

    match url.host_str() {
        Some(DROPBOX_HOST) if url.path().contains("/scl/fo/") => parse_dropbox(&url, original_url),
        Some(DRIVE_HOST) if url.path().contains("/drive/folders/") => {
            parse_gdrive(&url, original_url)
        }
        _ => Err(LinkError::Unrecognized(original_url.to_string())),
    }
}

/// Structural post-check of a parsed link.
pub fn validate(link: &ParsedLink) -> bool {
    if link.normalized.is_empty() {
        return false;
    }

    match link.provider {
        Provider::Dropbox => link.normalized.contains("dropbox.com") && !link.id.is_empty(),
        Provider::Gdrive => link.normalized.contains(DRIVE_HOST) && !link.id.is_empty(),
        Provider::Local => !link.id.is_empty(),
    }
}

/// Reject links a lister cannot serve: another provider's, or ones that
/// fail [`validate`].
pub(crate) fn ensure_listable(link: &ParsedLink, expected: Provider) -> Result<(), GalleryError> {
    if link.provider != expected {
        return Err(GalleryError::ProviderMismatch {
            expected,
            actual: link.provider,
        });
    }
    if !validate(link) {
        return Err(GalleryError::InvalidLink(link.original_url.clone()));
    }
    Ok(())
}

/// Human-readable provider name for a raw tag; unknown tags read "Unknown".
pub fn provider_name(tag: &str) -> &'static str {
    Provider::from_tag(tag).map_or(UNKNOWN_DISPLAY.name, Provider::name)
}

/// Presentation details for a raw tag, with a generic fallback.
pub fn provider_display(tag: &str) -> ProviderDisplay {
    Provider::from_tag(tag).map_or(UNKNOWN_DISPLAY, Provider::display)
}

fn is_local_path(input: &str) -> bool {
    if input.starts_with('/') || input.starts_with("./") || input.starts_with("../") {
        return true;
    }

    cfg!(windows) && (DRIVE_LETTER_REGEX.is_match(input) || input.starts_with(r"\\"))
}

fn parse_local(path: &str, original_url: &str) -> Result<ParsedLink, LinkError> {
    let resolved = resolve_path(Path::new(path)).map_err(|e| LinkError::Malformed {
        provider: Provider::Local,
        reason: format!("cannot resolve path: {e}"),
    })?;
    let resolved = resolved.to_string_lossy().into_owned();

    Ok(ParsedLink {
        provider: Provider::Local,
        normalized: resolved.clone(),
        id: resolved,
        original_url: original_url.to_string(),
    })
}

fn parse_dropbox(url: &Url, original_url: &str) -> Result<ParsedLink, LinkError> {
    let segments: Vec<&str> = url.path().split('/').collect();
    let id = segments
        .iter()
        .position(|segment| *segment == "scl")
        .and_then(|idx| segments.get(idx + 2))
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| LinkError::Malformed {
            provider: Provider::Dropbox,
            reason: "missing shared folder id after scl/fo".to_string(),
        })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "dl")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut normalized = url.clone();
    if kept.is_empty() {
        normalized.set_query(None);
    } else {
        normalized.query_pairs_mut().clear().extend_pairs(kept);
    }

    Ok(ParsedLink {
        provider: Provider::Dropbox,
        normalized: normalized.to_string(),
        id: (*id).to_string(),
        original_url: original_url.to_string(),
    })
}

fn parse_gdrive(url: &Url, original_url: &str) -> Result<ParsedLink, LinkError> {
    let segments: Vec<&str> = url.path().split('/').collect();
    let id = segments
        .iter()
        .position(|segment| *segment == "folders")
        .and_then(|idx| segments.get(idx + 1))
        .copied()
        .unwrap_or_default();

    if id.len() < MIN_DRIVE_ID_LEN {
        return Err(LinkError::Malformed {
            provider: Provider::Gdrive,
            reason: format!("folder id '{id}' is too short"),
        });
    }

    Ok(ParsedLink {
        provider: Provider::Gdrive,
        normalized: format!("https://{DRIVE_HOST}/drive/folders/{id}"),
        id: id.to_string(),
        original_url: original_url.to_string(),
    })
}

/// Make `path` absolute against the working directory and collapse `.`/`..`
/// lexically. The path does not need to exist.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }

    Ok(resolved)
}
