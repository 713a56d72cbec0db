//! Order-independent incremental digest over a set of 32-byte elements.
//!
//! The digest is the sum of its elements modulo 2^256 (an additive set hash).
//! Adding and removing elements are O(1), and two sets with the same
//! elements always have the same digest regardless of insertion order.
//! Elements are expected to be cryptographic digests themselves, which is
//! what makes the sum collision resistant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Additive 256-bit digest of a multiset of 32-byte elements.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetDigest {
    limbs: [u64; 4],
}

impl SetDigest {
    /// The digest of the empty set.
    pub const fn empty() -> Self {
        Self { limbs: [0; 4] }
    }

    /// Returns `true` if this is the digest of the empty set.
    pub fn is_empty(&self) -> bool {
        self.limbs == [0; 4]
    }

    /// Return the digest with `element` added.
    #[must_use]
    pub fn add(&self, element: &[u8; 32]) -> Self {
        let other = to_limbs(element);
        let mut limbs = [0u64; 4];
        let mut carry = false;
        for i in 0..4 {
            let (sum, c1) = self.limbs[i].overflowing_add(other[i]);
            let (sum, c2) = sum.overflowing_add(carry as u64);
            limbs[i] = sum;
            carry = c1 || c2;
        }
        Self { limbs }
    }

    /// Return the digest with `element` removed.
    ///
    /// Removing an element that was never added yields a digest that does
    /// not correspond to any set the caller built.
    #[must_use]
    pub fn remove(&self, element: &[u8; 32]) -> Self {
        let other = to_limbs(element);
        let mut limbs = [0u64; 4];
        let mut borrow = false;
        for i in 0..4 {
            let (diff, b1) = self.limbs[i].overflowing_sub(other[i]);
            let (diff, b2) = diff.overflowing_sub(borrow as u64);
            limbs[i] = diff;
            borrow = b1 || b2;
        }
        Self { limbs }
    }

    /// Little-endian 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.limbs.iter().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Hex-encoded string of [`SetDigest::to_bytes`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

fn to_limbs(bytes: &[u8; 32]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
        *limb = u64::from_le_bytes(word);
    }
    limbs
}

impl fmt::Debug for SetDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetDigest({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn element(byte: u8) -> [u8; 32] {
        crate::ContentHasher::BLOB.hash(&[byte])
    }

    #[test]
    fn empty_is_empty() {
        assert!(SetDigest::empty().is_empty());
        assert!(!SetDigest::empty().add(&element(1)).is_empty());
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let ab = SetDigest::empty().add(&element(1)).add(&element(2));
        let ba = SetDigest::empty().add(&element(2)).add(&element(1));
        assert_eq!(ab, ba);
    }

    #[test]
    fn remove_undoes_add() {
        let base = SetDigest::empty().add(&element(1));
        let round = base.add(&element(2)).remove(&element(2));
        assert_eq!(base, round);
    }

    #[test]
    fn carries_propagate_across_limbs() {
        let max = [0xff; 32];
        let mut one = [0u8; 32];
        one[0] = 1;
        // 2^256 - 1 + 1 wraps to zero.
        let wrapped = SetDigest::empty().add(&max).add(&one);
        assert!(wrapped.is_empty());
        assert_eq!(wrapped.remove(&one).to_bytes(), max);
    }

    #[test]
    fn different_sets_differ() {
        let a = SetDigest::empty().add(&element(1));
        let b = SetDigest::empty().add(&element(2));
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn add_then_remove_is_identity(
            seed in any::<[u8; 32]>(),
            extra in any::<[u8; 32]>(),
        ) {
            let base = SetDigest::empty().add(&seed);
            prop_assert_eq!(base.add(&extra).remove(&extra), base);
        }
    }
}
