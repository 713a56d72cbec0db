use pvc_types::{BlobId, CommitId};

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"pvc-blob-v1"`) that is prepended
/// to every hash computation. A blob and a commit with identical bytes
/// therefore never produce the same digest.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob content.
    pub const BLOB: Self = Self {
        domain: "pvc-blob-v1",
    };
    /// Hasher for commit headers.
    pub const COMMIT: Self = Self {
        domain: "pvc-commit-v1",
    };
    /// Hasher for a single `(filename, blob)` entry of a file map.
    pub const FILE_ENTRY: Self = Self {
        domain: "pvc-file-entry-v1",
    };
    /// Hasher for file-map keys (trie placement only).
    pub const FILE_KEY: Self = Self {
        domain: "pvc-file-key-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = self.start();
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Start an incremental hash that already carries the domain prefix.
    ///
    /// Callers feeding several variable-length fields should length-prefix
    /// them (see [`ContentHasher::update_field`]).
    pub fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// Feed a length-prefixed field into an incremental hash.
    pub fn update_field(hasher: &mut blake3::Hasher, field: &[u8]) {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field);
    }

    /// Content-addressed identifier for blob bytes.
    pub fn blob_id(data: &[u8]) -> BlobId {
        BlobId::from_hash(Self::BLOB.hash(data))
    }

    /// Digest of one file-map entry, used as a [`crate::SetDigest`] element.
    pub fn file_entry(name: &str, blob: &BlobId) -> [u8; 32] {
        let mut hasher = Self::FILE_ENTRY.start();
        Self::update_field(&mut hasher, name.as_bytes());
        hasher.update(blob.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Trie placement hash for a filename.
    pub fn file_key(name: &str) -> u64 {
        let digest = Self::FILE_KEY.hash(name.as_bytes());
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word)
    }

    /// Verify that blob bytes produce the expected identifier.
    pub fn verify_blob(data: &[u8], expected: &BlobId) -> bool {
        Self::blob_id(data) == *expected
    }

    /// Wrap a finished commit digest.
    pub fn commit_id(hasher: &blake3::Hasher) -> CommitId {
        CommitId::from_hash(*hasher.finalize().as_bytes())
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_id_is_deterministic() {
        assert_eq!(
            ContentHasher::blob_id(b"hello world"),
            ContentHasher::blob_id(b"hello world")
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let blob = ContentHasher::BLOB.hash(data);
        let commit = ContentHasher::COMMIT.hash(data);
        let entry = ContentHasher::FILE_ENTRY.hash(data);
        assert_ne!(blob, commit);
        assert_ne!(blob, entry);
        assert_ne!(commit, entry);
    }

    #[test]
    fn verify_blob_detects_tampering() {
        let id = ContentHasher::blob_id(b"original");
        assert!(ContentHasher::verify_blob(b"original", &id));
        assert!(!ContentHasher::verify_blob(b"tampered", &id));
    }

    #[test]
    fn file_entry_separates_name_and_blob() {
        let blob = BlobId::from_hash([1; 32]);
        assert_ne!(
            ContentHasher::file_entry("a.txt", &blob),
            ContentHasher::file_entry("b.txt", &blob)
        );
        assert_ne!(
            ContentHasher::file_entry("a.txt", &blob),
            ContentHasher::file_entry("a.txt", &BlobId::from_hash([2; 32]))
        );
    }

    #[test]
    fn length_prefix_prevents_field_shifting() {
        let mut a = ContentHasher::COMMIT.start();
        ContentHasher::update_field(&mut a, b"ab");
        ContentHasher::update_field(&mut a, b"c");
        let mut b = ContentHasher::COMMIT.start();
        ContentHasher::update_field(&mut b, b"a");
        ContentHasher::update_field(&mut b, b"bc");
        assert_ne!(ContentHasher::commit_id(&a), ContentHasher::commit_id(&b));
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::BLOB.hash(b"data"));
    }
}
