//! Loader configuration.

use crate::endpoint::BackendEndpoint;

/// Primary environment variable naming the backend address.
pub const BACKEND_BASE_URL_ENV: &str = "NOWPLAYING_BACKEND_BASE_URL";

/// Secondary environment variable, consulted when the primary one is unset.
pub const API_BASE_URL_ENV: &str = "NOWPLAYING_API_BASE_URL";

/// Inputs to backend address resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Explicitly configured backend address
    pub base_url: Option<String>,
    /// Address of the page hosting the player, if any
    pub page_location: Option<String>,
}

impl LoaderConfig {
    /// Configuration with an explicit backend address.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            page_location: None,
        }
    }

    /// Read the backend address from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the backend address through `lookup`.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = [BACKEND_BASE_URL_ENV, API_BASE_URL_ENV]
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());

        Self {
            base_url,
            page_location: None,
        }
    }

    /// Set the hosting page location.
    #[must_use]
    pub fn with_page_location(mut self, location: impl Into<String>) -> Self {
        self.page_location = Some(location.into());
        self
    }

    /// Resolve the backend endpoint from this configuration.
    pub fn endpoint(&self) -> BackendEndpoint {
        BackendEndpoint::resolve(self.base_url.as_deref(), self.page_location.as_deref())
    }
}
