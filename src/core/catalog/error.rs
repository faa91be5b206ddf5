//! Error types for catalog access.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised by catalog providers.
///
/// The picker only ever sees these as a catalog-fetch-failure: the cache
/// logs them and degrades to an empty collection.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure talking to the backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider misconfigured (missing URL or key).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected input (e.g. an item draft without a name).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No item with the given id.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Provider could not serve the request for another reason.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Config(_) => "Catalog backend is not configured.".to_string(),
            Self::NotFound(_) => "Item no longer exists.".to_string(),
            _ => "Failed to load items.".to_string(),
        }
    }
}
