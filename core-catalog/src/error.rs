//! Error types for the catalog client

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Catalog client errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog web service could not be reached
    #[error("Unable to connect to catalog at {url}: {message}")]
    Connection { url: String, message: String },

    /// Authentication was refused or no token is held
    #[error("Catalog authentication failed: {0}")]
    Authentication(String),

    /// The catalog answered with a non-success status
    #[error("Catalog API error on {endpoint} (status {status_code}): {message}")]
    Api {
        endpoint: String,
        status_code: u16,
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Failed to parse catalog response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    /// An attribute write was not acknowledged with `result: "ok"`
    #[error("Attribute write to set '{set}' for file {file_id} failed: {message}")]
    AttributeWriteFailed {
        set: String,
        file_id: u64,
        message: String,
    },

    /// Transport error from the HTTP bridge
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl CatalogError {
    /// Whether the error means the catalog itself is unusable for this run.
    pub fn is_unreachable(&self) -> bool {
        match self {
            CatalogError::Connection { .. } | CatalogError::Authentication(_) => true,
            CatalogError::Bridge(err) => err.is_unreachable(),
            _ => false,
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_classification() {
        assert!(CatalogError::Authentication("no token".into()).is_unreachable());
        assert!(CatalogError::Bridge(BridgeError::Timeout).is_unreachable());
        assert!(!CatalogError::Parse {
            endpoint: "/v1/files".into(),
            message: "eof".into()
        }
        .is_unreachable());
    }

    #[test]
    fn test_write_failure_message_names_file() {
        let err = CatalogError::AttributeWriteFailed {
            set: "flickr".into(),
            file_id: 42,
            message: "result was 'error'".into(),
        };
        assert!(err.to_string().contains("file 42"));
        assert!(err.to_string().contains("'flickr'"));
    }
}
