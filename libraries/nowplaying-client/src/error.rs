//! Error mapping for the playlist loader.

use nowplaying_core::LoadError;

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Map a transport error onto the load error taxonomy.
pub(crate) fn request_error(err: &reqwest::Error) -> LoadError {
    if let Some(status) = err.status() {
        LoadError::Status {
            url: err.url().map(ToString::to_string).unwrap_or_default(),
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        LoadError::parse(err.to_string())
    } else if err.is_builder() {
        LoadError::InvalidUrl(err.to_string())
    } else {
        LoadError::request(err.to_string())
    }
}
