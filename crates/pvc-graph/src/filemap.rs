//! Persistent filename → blob mapping.
//!
//! [`FileMap`] is a hash-array-mapped trie whose nodes are shared through
//! `Arc`. Inserting a file copies only the nodes on the path to that file's
//! slot (O(log n)); every other subtree is shared with the previous version.
//! Each commit therefore holds a complete snapshot while paying only for the
//! path it changed.
//!
//! The map also keeps an incremental [`SetDigest`] of its entries, so the
//! digest of a snapshot is available in O(1) and does not depend on the order
//! in which files were inserted.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pvc_crypto::{ContentHasher, SetDigest};
use pvc_types::BlobId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const BITS: u32 = 5;
const MASK: u64 = (1 << BITS) - 1;

#[derive(Clone)]
enum Slot {
    Entry {
        hash: u64,
        name: Arc<str>,
        blob: BlobId,
    },
    /// Distinct names whose 64-bit placement hashes are equal.
    Collision {
        hash: u64,
        entries: Arc<Vec<(Arc<str>, BlobId)>>,
    },
    Node(Arc<Node>),
}

#[derive(Clone, Default)]
struct Node {
    bitmap: u32,
    slots: Vec<Slot>,
}

fn slot_index(hash: u64, shift: u32) -> u32 {
    ((hash >> shift) & MASK) as u32
}

impl Node {
    fn position(&self, bit: u32) -> usize {
        (self.bitmap & (bit - 1)).count_ones() as usize
    }

    fn get(&self, hash: u64, shift: u32, name: &str) -> Option<BlobId> {
        let bit = 1u32 << slot_index(hash, shift);
        if self.bitmap & bit == 0 {
            return None;
        }
        match &self.slots[self.position(bit)] {
            Slot::Entry { name: n, blob, .. } => (&**n == name).then_some(*blob),
            Slot::Collision { entries, .. } => entries
                .iter()
                .find(|(n, _)| &**n == name)
                .map(|(_, blob)| *blob),
            Slot::Node(child) => child.get(hash, shift + BITS, name),
        }
    }

    /// Path-copying insert. Returns the new node and the blob previously
    /// stored under `name`, if any.
    fn insert(&self, hash: u64, shift: u32, name: &Arc<str>, blob: BlobId) -> (Node, Option<BlobId>) {
        let bit = 1u32 << slot_index(hash, shift);
        let pos = self.position(bit);
        let mut node = self.clone();

        if self.bitmap & bit == 0 {
            node.bitmap |= bit;
            node.slots.insert(
                pos,
                Slot::Entry {
                    hash,
                    name: Arc::clone(name),
                    blob,
                },
            );
            return (node, None);
        }

        let new_entry = Slot::Entry {
            hash,
            name: Arc::clone(name),
            blob,
        };
        let (replacement, previous) = match &self.slots[pos] {
            Slot::Entry {
                hash: existing_hash,
                name: existing_name,
                blob: existing_blob,
            } => {
                if existing_name == name {
                    (new_entry, Some(*existing_blob))
                } else if *existing_hash == hash {
                    let entries = vec![
                        (Arc::clone(existing_name), *existing_blob),
                        (Arc::clone(name), blob),
                    ];
                    (
                        Slot::Collision {
                            hash,
                            entries: Arc::new(entries),
                        },
                        None,
                    )
                } else {
                    let existing = self.slots[pos].clone();
                    let child = Node::pair(existing, *existing_hash, new_entry, hash, shift + BITS);
                    (Slot::Node(Arc::new(child)), None)
                }
            }
            Slot::Collision {
                hash: existing_hash,
                entries,
            } => {
                if *existing_hash == hash {
                    let mut entries = (**entries).clone();
                    let previous = match entries.iter_mut().find(|(n, _)| n == name) {
                        Some(entry) => Some(std::mem::replace(&mut entry.1, blob)),
                        None => {
                            entries.push((Arc::clone(name), blob));
                            None
                        }
                    };
                    (
                        Slot::Collision {
                            hash,
                            entries: Arc::new(entries),
                        },
                        previous,
                    )
                } else {
                    let existing = self.slots[pos].clone();
                    let child = Node::pair(existing, *existing_hash, new_entry, hash, shift + BITS);
                    (Slot::Node(Arc::new(child)), None)
                }
            }
            Slot::Node(child) => {
                let (child, previous) = child.insert(hash, shift + BITS, name, blob);
                (Slot::Node(Arc::new(child)), previous)
            }
        };
        node.slots[pos] = replacement;
        (node, previous)
    }

    /// Build the smallest subtree holding two slots with distinct hashes.
    fn pair(a: Slot, hash_a: u64, b: Slot, hash_b: u64, shift: u32) -> Node {
        let index_a = slot_index(hash_a, shift);
        let index_b = slot_index(hash_b, shift);
        if index_a == index_b {
            let child = Node::pair(a, hash_a, b, hash_b, shift + BITS);
            return Node {
                bitmap: 1 << index_a,
                slots: vec![Slot::Node(Arc::new(child))],
            };
        }
        let slots = if index_a < index_b { vec![a, b] } else { vec![b, a] };
        Node {
            bitmap: (1 << index_a) | (1 << index_b),
            slots,
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<(&'a str, BlobId)>) {
        for slot in &self.slots {
            match slot {
                Slot::Entry { name, blob, .. } => out.push((&**name, *blob)),
                Slot::Collision { entries, .. } => {
                    out.extend(entries.iter().map(|(n, b)| (&**n, *b)));
                }
                Slot::Node(child) => child.collect(out),
            }
        }
    }
}

/// Immutable snapshot of tracked files: filename → [`BlobId`].
///
/// Cloning is O(1). [`FileMap::insert`] returns a new map and leaves `self`
/// untouched.
#[derive(Clone, Default)]
pub struct FileMap {
    root: Arc<Node>,
    len: usize,
    digest: SetDigest,
}

impl FileMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no files are tracked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up a file by exact name.
    pub fn get(&self, name: &str) -> Option<BlobId> {
        self.root.get(ContentHasher::file_key(name), 0, name)
    }

    /// Returns `true` if `name` is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Return a new map with `name` set to `blob`.
    #[must_use]
    pub fn insert(&self, name: &str, blob: BlobId) -> Self {
        let name: Arc<str> = Arc::from(name);
        let (root, previous) = self.root.insert(ContentHasher::file_key(&name), 0, &name, blob);
        let mut digest = self.digest;
        let mut len = self.len;
        match previous {
            Some(old) => digest = digest.remove(&ContentHasher::file_entry(&name, &old)),
            None => len += 1,
        }
        digest = digest.add(&ContentHasher::file_entry(&name, &blob));
        Self {
            root: Arc::new(root),
            len,
            digest,
        }
    }

    /// Order-independent digest of all `(name, blob)` entries.
    pub fn digest(&self) -> SetDigest {
        self.digest
    }

    /// All entries sorted by filename.
    pub fn entries(&self) -> Vec<(&str, BlobId)> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect(&mut out);
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// All tracked filenames, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries().into_iter().map(|(name, _)| name).collect()
    }

    /// Every distinct blob referenced by this snapshot.
    pub fn blob_ids(&self) -> Vec<BlobId> {
        let mut ids: Vec<BlobId> = self.entries().into_iter().map(|(_, b)| b).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Copy the entries into an ordered map.
    pub fn to_btree(&self) -> BTreeMap<String, BlobId> {
        self.entries()
            .into_iter()
            .map(|(name, blob)| (name.to_string(), blob))
            .collect()
    }
}

impl FromIterator<(String, BlobId)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (String, BlobId)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FileMap::new(), |map, (name, blob)| map.insert(&name, blob))
    }
}

impl PartialEq for FileMap {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.root, &other.root) {
            return true;
        }
        self.len == other.len && self.digest == other.digest && self.entries() == other.entries()
    }
}

impl Eq for FileMap {}

impl fmt::Debug for FileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl Serialize for FileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_btree().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FileMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, BlobId>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
