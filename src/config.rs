//! Tunables shared by the listers.

use std::time::Duration;

use tracing::warn;

/// Dropbox API host.
pub const DROPBOX_API_BASE: &str = "https://api.dropboxapi.com";

/// Google APIs host (Drive API v3 lives under `/drive/v3`).
pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com";

/// Google OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Listing results are reused for this long.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Pause between page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// In-flight temporary-link requests per Dropbox listing.
pub const DEFAULT_LINK_CONCURRENCY: usize = 4;

/// Behavior knobs for a lister instance.
///
/// Credentials are not part of this; they are passed to each lister's
/// constructor.
#[derive(Debug, Clone)]
pub struct ListerConfig {
    pub cache_ttl: Duration,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub link_concurrency: usize,
    pub dropbox_api_base: String,
    pub google_api_base: String,
}

impl Default for ListerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            page_delay: DEFAULT_PAGE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            link_concurrency: DEFAULT_LINK_CONCURRENCY,
            dropbox_api_base: DROPBOX_API_BASE.to_string(),
            google_api_base: GOOGLE_API_BASE.to_string(),
        }
    }
}

impl ListerConfig {
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Zero is treated as one.
    pub fn with_link_concurrency(mut self, concurrency: usize) -> Self {
        self.link_concurrency = concurrency.max(1);
        self
    }

    /// Point the Dropbox lister at another host, e.g. a mock server.
    pub fn with_dropbox_api_base(mut self, base: impl Into<String>) -> Self {
        self.dropbox_api_base = trim_base(base.into());
        self
    }

    /// Point the Drive lister at another host, e.g. a mock server.
    pub fn with_google_api_base(mut self, base: impl Into<String>) -> Self {
        self.google_api_base = trim_base(base.into());
        self
    }

    /// HTTP client honoring the request timeout.
    pub(crate) fn http_client(&self) -> reqwest::Client {
        match reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    error = %e,
                    timeout = ?self.request_timeout,
                    "could not build HTTP client, requests will not time out"
                );
                reqwest::Client::new()
            }
        }
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
