use bytes::Bytes;
use pvc_types::BlobId;

use crate::error::{StoreError, StoreResult};

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written: the same bytes always produce the
///   same id.
/// - `put` is idempotent and deduplicating, including under concurrent
///   callers submitting identical content.
/// - Concurrent reads are always safe.
pub trait BlobStore: Send + Sync {
    /// Store `content` and return its identifier.
    ///
    /// If a blob with the same digest already exists, the existing id is
    /// returned and nothing new is stored.
    fn put(&self, content: Bytes) -> StoreResult<BlobId>;

    /// Read a blob's bytes. Fails with [`StoreError::NotFound`] if unknown.
    fn get(&self, id: &BlobId) -> StoreResult<Bytes>;

    /// Check whether a blob exists.
    fn contains(&self, id: &BlobId) -> bool;

    /// Delete a blob by id. Returns `true` if the blob existed.
    ///
    /// Intended for garbage collection only. Deleting a referenced blob
    /// corrupts every commit that reaches it.
    fn delete(&self, id: &BlobId) -> bool;

    /// Keep only the blobs for which `keep` returns `true`.
    ///
    /// Returns the number of blobs removed.
    fn retain(&self, keep: &dyn Fn(&BlobId) -> bool) -> usize;

    /// Re-hash a stored blob and compare against its identifier.
    fn verify(&self, id: &BlobId) -> StoreResult<()> {
        let data = self.get(id)?;
        let computed = pvc_crypto::ContentHasher::blob_id(&data);
        if computed != *id {
            return Err(StoreError::CorruptBlob { id: *id, computed });
        }
        Ok(())
    }

    /// Store several blobs and return their ids in order.
    fn put_batch(&self, contents: &[Bytes]) -> StoreResult<Vec<BlobId>> {
        contents.iter().map(|c| self.put(c.clone())).collect()
    }
}
