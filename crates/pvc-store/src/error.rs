use pvc_types::BlobId;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(BlobId),

    /// The store was configured to reject empty content.
    #[error("empty content is not accepted by this store")]
    EmptyContent,

    /// Stored bytes no longer hash to their identifier.
    #[error("corrupt blob {id}: content hashes to {computed}")]
    CorruptBlob { id: BlobId, computed: BlobId },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
