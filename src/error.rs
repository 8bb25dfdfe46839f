use thiserror::Error;

/// Failure while pulling the catalog from the remote service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog API returned {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("malformed catalog payload: {0}")]
    Decode(String),
}

impl From<simd_json::Error> for FetchError {
    fn from(err: simd_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// The cache had nothing to fall back on.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable and no snapshot cached: {0}")]
    Unavailable(#[source] FetchError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tracked item not found: {0}")]
    NotFound(String),
}

/// A reconciliation run aborted. Nothing was written.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
