use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of hex characters in the short display form of an identifier.
pub const SHORT_HEX_LEN: usize = 10;

macro_rules! digest_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Create an identifier from a pre-computed 32-byte digest.
            pub const fn from_hash(hash: [u8; 32]) -> Self {
                Self(hash)
            }

            /// The raw 32-byte digest.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Full hex-encoded string (64 characters).
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Fixed-width short form used for display.
            pub fn short_hex(&self) -> String {
                hex::encode(&self.0[..SHORT_HEX_LEN / 2])
            }

            /// Parse from a full 64-character hex string.
            pub fn from_hex(s: &str) -> Result<Self, TypeError> {
                let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
                if bytes.len() != 32 {
                    return Err(TypeError::InvalidLength {
                        expected: 32,
                        actual: bytes.len(),
                    });
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.short_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; 32] {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

digest_id! {
    /// Content-addressed identifier of a blob.
    ///
    /// A `BlobId` is the domain-separated BLAKE3 digest of the blob's bytes.
    /// Identical content always produces the same `BlobId`, which is what
    /// makes blob storage deduplicating.
    BlobId
}

digest_id! {
    /// Identifier of a commit node.
    ///
    /// Derived from the commit's parent, file snapshot digest, timestamp and
    /// message, so two commits with different snapshots never share an id.
    CommitId
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_hex_is_fixed_width() {
        let id = BlobId::from_hash([0xab; 32]);
        assert_eq!(id.short_hex(), "ababababab");
        assert_eq!(id.short_hex().len(), SHORT_HEX_LEN);
    }

    #[test]
    fn display_is_full_hex() {
        let id = CommitId::from_hash([7; 32]);
        let display = format!("{id}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, id.to_hex());
    }

    #[test]
    fn debug_names_the_kind() {
        let blob = BlobId::from_hash([1; 32]);
        let commit = CommitId::from_hash([1; 32]);
        assert!(format!("{blob:?}").starts_with("BlobId("));
        assert!(format!("{commit:?}").starts_with("CommitId("));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = CommitId::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_garbage() {
        let err = BlobId::from_hex("zz").unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let id = CommitId::from_hash([42; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: CommitId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ordering_follows_bytes() {
        assert!(BlobId::from_hash([0; 32]) < BlobId::from_hash([1; 32]));
    }

    proptest! {
        #[test]
        fn hex_parse_inverts_to_hex(bytes in any::<[u8; 32]>()) {
            let id = BlobId::from_hash(bytes);
            prop_assert_eq!(BlobId::from_hex(&id.to_hex()).unwrap(), id);
        }
    }
}
