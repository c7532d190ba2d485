//! Backend base-address resolution and URL normalization.

use tracing::debug;
use url::Url;

/// Backend address used during local development and as the last resort.
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://127.0.0.1:8000";

/// Resolved base address of the playlist backend.
///
/// Always stored without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    base: String,
}

impl BackendEndpoint {
    /// Use `base` verbatim (one trailing slash is trimmed).
    pub fn new(base: impl AsRef<str>) -> Self {
        Self {
            base: trim_trailing_slash(base.as_ref()).to_string(),
        }
    }

    /// Resolve the backend address.
    ///
    /// Precedence:
    /// 1. a non-empty `configured` address
    /// 2. [`DEFAULT_BACKEND_BASE_URL`] when the page is served from
    ///    `localhost` or `127.0.0.1`
    /// 3. the page origin
    /// 4. [`DEFAULT_BACKEND_BASE_URL`]
    ///
    /// `page_location` is the address of the page hosting the player, when
    /// there is one. An unparseable location counts as absent.
    pub fn resolve(configured: Option<&str>, page_location: Option<&str>) -> Self {
        if let Some(configured) = configured.map(str::trim).filter(|s| !s.is_empty()) {
            debug!(base = %configured, "Using configured backend address");
            return Self::new(configured);
        }

        let page = page_location.and_then(|location| match Url::parse(location) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(location = %location, error = %e, "Ignoring unparseable page location");
                None
            }
        });

        if let Some(page) = page {
            let host = page.host_str().unwrap_or_default().to_ascii_lowercase();
            if host.contains("localhost") || host.contains("127.0.0.1") {
                return Self::new(DEFAULT_BACKEND_BASE_URL);
            }

            let origin = page.origin();
            if origin.is_tuple() {
                return Self::new(origin.ascii_serialization());
            }
        }

        Self::new(DEFAULT_BACKEND_BASE_URL)
    }

    /// Base address without trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Build an absolute URL for `path` relative to this endpoint.
    pub fn url(&self, path: &str) -> String {
        ensure_absolute_url(path, &self.base)
    }
}

impl Default for BackendEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_BASE_URL)
    }
}

impl std::fmt::Display for BackendEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// Make `input` absolute against `base`.
///
/// - empty input yields the base itself
/// - `http://` and `https://` locators (any case) pass through untouched
/// - anything else is joined to the base with exactly one `/`
pub fn ensure_absolute_url(input: &str, base: &str) -> String {
    let base = trim_trailing_slash(base);

    if input.is_empty() {
        return base.to_string();
    }

    if is_absolute(input) {
        return input.to_string();
    }

    let path = input.strip_prefix('/').unwrap_or(input);
    format!("{}/{}", base, path)
}

fn is_absolute(input: &str) -> bool {
    let lower = input
        .get(..8)
        .unwrap_or(input)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn trim_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_base() {
        assert_eq!(
            ensure_absolute_url("", "http://127.0.0.1:8000/"),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn test_absolute_input_passes_through() {
        let input = "HTTPS://cdn.example.com/a.mp3";
        assert_eq!(ensure_absolute_url(input, "http://backend"), input);
        assert_eq!(
            ensure_absolute_url("http://cdn.example.com/a.mp3", "http://backend"),
            "http://cdn.example.com/a.mp3"
        );
    }

    #[test]
    fn test_relative_input_joined_with_single_slash() {
        assert_eq!(
            ensure_absolute_url("media/a.mp3", "http://backend/"),
            "http://backend/media/a.mp3"
        );
        assert_eq!(
            ensure_absolute_url("/media/a.mp3", "http://backend"),
            "http://backend/media/a.mp3"
        );
    }

    #[test]
    fn test_other_schemes_are_relative() {
        assert_eq!(
            ensure_absolute_url("ftp://host/a.mp3", "http://backend"),
            "http://backend/ftp://host/a.mp3"
        );
    }

    #[test]
    fn test_short_inputs_do_not_panic() {
        assert_eq!(ensure_absolute_url("a", "http://b"), "http://b/a");
        assert_eq!(ensure_absolute_url("é", "http://b"), "http://b/é");
    }

    #[test]
    fn test_configured_wins() {
        let endpoint = BackendEndpoint::resolve(
            Some("https://api.example.com/"),
            Some("http://localhost:3000/"),
        );
        assert_eq!(endpoint.as_str(), "https://api.example.com");
    }

    #[test]
    fn test_blank_configured_is_ignored() {
        let endpoint = BackendEndpoint::resolve(Some("  "), None);
        assert_eq!(endpoint.as_str(), DEFAULT_BACKEND_BASE_URL);
    }

    #[test]
    fn test_local_page_uses_development_default() {
        for page in [
            "http://localhost:3000/",
            "http://LOCALHOST:3000/about",
            "http://127.0.0.1:5173/",
        ] {
            let endpoint = BackendEndpoint::resolve(None, Some(page));
            assert_eq!(endpoint.as_str(), DEFAULT_BACKEND_BASE_URL, "page: {}", page);
        }
    }

    #[test]
    fn test_remote_page_uses_origin() {
        let endpoint = BackendEndpoint::resolve(None, Some("https://portfolio.example.com/blog/post"));
        assert_eq!(endpoint.as_str(), "https://portfolio.example.com");

        let endpoint = BackendEndpoint::resolve(None, Some("https://portfolio.example.com:8443/"));
        assert_eq!(endpoint.as_str(), "https://portfolio.example.com:8443");
    }

    #[test]
    fn test_no_page_uses_default() {
        assert_eq!(
            BackendEndpoint::resolve(None, None),
            BackendEndpoint::default()
        );
        assert_eq!(
            BackendEndpoint::resolve(None, Some("not a url")).as_str(),
            DEFAULT_BACKEND_BASE_URL
        );
    }

    #[test]
    fn test_endpoint_builds_paths() {
        let endpoint = BackendEndpoint::new("http://backend/");
        assert_eq!(endpoint.url("api/music/list"), "http://backend/api/music/list");
    }
}
