use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use pvc_types::BlobId;
use tracing::debug;

use crate::blob::Blob;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Blobs are held behind a `RwLock`. Reads hand out [`Bytes`] handles that
/// share the single stored allocation, so a blob is never physically
/// duplicated by reads either.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, Blob>>,
    forbid_empty: bool,
}

impl InMemoryBlobStore {
    /// Create a new empty store that accepts empty content.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            forbid_empty: false,
        }
    }

    /// Create a store that rejects empty content with
    /// [`StoreError::EmptyContent`].
    pub fn forbidding_empty() -> Self {
        Self {
            forbid_empty: true,
            ..Self::new()
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(Blob::size)
            .sum()
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all blob ids in the store.
    pub fn all_ids(&self) -> Vec<BlobId> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut ids: Vec<BlobId> = map.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Read the full blob record, including its identifier.
    pub fn blob(&self, id: &BlobId) -> StoreResult<Blob> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, content: Bytes) -> StoreResult<BlobId> {
        if self.forbid_empty && content.is_empty() {
            return Err(StoreError::EmptyContent);
        }
        // Hash outside the lock.
        let blob = Blob::new(content);
        let id = blob.id();

        if self.blobs.read().expect("lock poisoned").contains_key(&id) {
            return Ok(id);
        }

        let mut map = self.blobs.write().expect("lock poisoned");
        // Re-check under the write lock: a concurrent put may have won.
        if !map.contains_key(&id) {
            debug!(blob = %id.short_hex(), size = blob.size(), "stored blob");
            map.insert(id, blob);
        }
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Bytes> {
        let map = self.blobs.read().expect("lock poisoned");
        map.get(id)
            .map(|blob| blob.data().clone())
            .ok_or(StoreError::NotFound(*id))
    }

    fn contains(&self, id: &BlobId) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(id)
    }

    fn delete(&self, id: &BlobId) -> bool {
        self.blobs.write().expect("lock poisoned").remove(id).is_some()
    }

    fn retain(&self, keep: &dyn Fn(&BlobId) -> bool) -> usize {
        let mut map = self.blobs.write().expect("lock poisoned");
        let before = map.len();
        map.retain(|id, _| keep(id));
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, remaining = map.len(), "swept blobs");
        }
        removed
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("forbid_empty", &self.forbid_empty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // -----------------------------------------------------------------------
    // Core put/get
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::from_static(b"hello world")).unwrap();
        assert_eq!(store.get(&id).unwrap(), Bytes::from_static(b"hello world"));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryBlobStore::new();
        let id = BlobId::from_hash([9; 32]);
        let err = store.get(&id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[test]
    fn blob_record_carries_id() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::from_static(b"record")).unwrap();
        let blob = store.blob(&id).unwrap();
        assert_eq!(blob.id(), id);
        assert!(blob.verify());
    }

    // -----------------------------------------------------------------------
    // Deduplication
    // -----------------------------------------------------------------------

    #[test]
    fn same_content_produces_same_id() {
        let store = InMemoryBlobStore::new();
        let id1 = store.put(Bytes::from_static(b"identical")).unwrap();
        let id2 = store.put(Bytes::from(b"identical".to_vec())).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_content_produces_different_ids() {
        let store = InMemoryBlobStore::new();
        let id1 = store.put(Bytes::from_static(b"aaa")).unwrap();
        let id2 = store.put(Bytes::from_static(b"bbb")).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn reads_share_the_stored_allocation() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::from(vec![1u8; 1024])).unwrap();
        let a = store.get(&id).unwrap();
        let b = store.get(&id).unwrap();
        assert_eq!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn concurrent_identical_puts_store_one_copy() {
        let store = Arc::new(InMemoryBlobStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(Bytes::from_static(b"racing content")).unwrap())
            })
            .collect();

        let ids: Vec<BlobId> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Empty content policy
    // -----------------------------------------------------------------------

    #[test]
    fn empty_content_accepted_by_default() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::new()).unwrap();
        assert!(store.get(&id).unwrap().is_empty());
    }

    #[test]
    fn empty_content_rejected_when_forbidden() {
        let store = InMemoryBlobStore::forbidding_empty();
        let err = store.put(Bytes::new()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyContent));
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Delete / retain
    // -----------------------------------------------------------------------

    #[test]
    fn delete_present_and_missing() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::from_static(b"to-delete")).unwrap();
        assert!(store.delete(&id));
        assert!(!store.contains(&id));
        assert!(!store.delete(&id));
    }

    #[test]
    fn retain_sweeps_unwanted() {
        let store = InMemoryBlobStore::new();
        let keep = store.put(Bytes::from_static(b"keep")).unwrap();
        let drop = store.put(Bytes::from_static(b"drop")).unwrap();
        let removed = store.retain(&|id| *id == keep);
        assert_eq!(removed, 1);
        assert!(store.contains(&keep));
        assert!(!store.contains(&drop));
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn total_bytes_counts_unique_content() {
        let store = InMemoryBlobStore::new();
        store.put(Bytes::from_static(b"12345")).unwrap();
        store.put(Bytes::from_static(b"12345")).unwrap();
        store.put(Bytes::from_static(b"123456789")).unwrap();
        assert_eq!(store.total_bytes(), 14);
    }

    #[test]
    fn all_ids_is_sorted() {
        let store = InMemoryBlobStore::new();
        for content in [&b"aaa"[..], b"bbb", b"ccc"] {
            store.put(Bytes::copy_from_slice(content)).unwrap();
        }
        let ids = store.all_ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn clear_removes_all() {
        let store = InMemoryBlobStore::new();
        store.put(Bytes::from_static(b"a")).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn verify_accepts_intact_blobs() {
        let store = InMemoryBlobStore::new();
        let id = store.put(Bytes::from_static(b"verify me")).unwrap();
        store.verify(&id).unwrap();
    }

    #[test]
    fn put_batch_preserves_order() {
        let store = InMemoryBlobStore::new();
        let contents = vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")];
        let ids = store.put_batch(&contents).unwrap();
        assert_eq!(store.get(&ids[0]).unwrap(), contents[0]);
        assert_eq!(store.get(&ids[1]).unwrap(), contents[1]);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlobStore::new();
        store.put(Bytes::from_static(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlobStore"));
        assert!(debug.contains("blob_count"));
    }
}
