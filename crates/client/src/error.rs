//! Unified error type for client components.
//!
//! Lower layers keep their own error enums ([`ApiError`], [`StoreError`]);
//! screen-level components return `ClientError` so callers handle one type.
//! Nothing here is fatal: callers log and fall back to stale or empty data.

use souk_core::IdError;
use thiserror::Error;

use crate::api::ApiError;
use crate::store::StoreError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An identifier supplied by the caller was invalid.
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::from(ApiError::Unsuccessful("shop closed".to_string()));
        assert_eq!(err.to_string(), "API error: Request unsuccessful: shop closed");
    }

    #[test]
    fn test_invalid_id_display() {
        let err = ClientError::from(IdError::Empty { kind: "ProductId" });
        assert_eq!(err.to_string(), "Invalid identifier: ProductId cannot be empty");
    }
}
