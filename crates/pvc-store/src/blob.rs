use bytes::Bytes;
use pvc_crypto::ContentHasher;
use pvc_types::BlobId;
use serde::{Deserialize, Serialize};

/// Immutable file content together with its content-addressed identifier.
///
/// The bytes are held in a [`Bytes`] buffer, so clones share one allocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    id: BlobId,
    data: Bytes,
}

impl Blob {
    /// Create a blob, computing its identifier from `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let id = ContentHasher::blob_id(&data);
        Self { id, data }
    }

    /// The content-addressed identifier.
    pub fn id(&self) -> BlobId {
        self.id
    }

    /// The blob's bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the blob, returning its bytes.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns `true` if the bytes still hash to the stored identifier.
    pub fn verify(&self) -> bool {
        ContentHasher::verify_blob(&self.data, &self.id)
    }
}
