use crate::models::ListingId;
use reqwest::StatusCode;

/// Result type for flat-ledger operations
pub type Result<T> = std::result::Result<T, ListingError>;

/// Why the backend could not be reached
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkFailure {
    #[error("request timed out")]
    Timeout,

    #[error("backend unreachable: {0}")]
    Unreachable(String),
}

/// Errors surfaced by the remote client and the listing store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingError {
    #[error("Invalid listing: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(NetworkFailure),

    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Listing {0} not found")]
    NotFound(ListingId),

    #[error("Backend rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },
}

impl ListingError {
    /// Map a non-success HTTP status into the error taxonomy.
    ///
    /// `id` is the listing the request targeted, if any; a 404 without one
    /// means the collection endpoint itself is missing.
    pub fn from_status(status: StatusCode, id: Option<&ListingId>, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        } else {
            body.trim().to_string()
        };

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => ListingError::NotFound(id.clone()),
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
                ListingError::Validation(message)
            }
            _ => ListingError::ServerRejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ListingError::Network(NetworkFailure::Timeout))
    }
}

impl From<reqwest::Error> for ListingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ListingError::Network(NetworkFailure::Timeout)
        } else if err.is_decode() {
            ListingError::Protocol(err.to_string())
        } else {
            ListingError::Network(NetworkFailure::Unreachable(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for ListingError {
    fn from(err: serde_json::Error) -> Self {
        ListingError::Protocol(err.to_string())
    }
}
