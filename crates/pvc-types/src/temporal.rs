use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Hybrid clock reading stamped on every commit.
///
/// Combines a wall-clock component with a logical counter so that a single
/// clock can hand out strictly increasing readings even when several commits
/// land in the same millisecond. Readings are informational only; nothing in
/// the commit graph orders by them.
///
/// Ordering: `physical_ms` then `logical`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Logical counter for readings within the same millisecond.
    pub logical: u32,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub const fn new(physical_ms: u64, logical: u32) -> Self {
        Self {
            physical_ms,
            logical,
        }
    }

    /// The current wall-clock time with a zero logical counter.
    pub fn now() -> Self {
        Self::new(wall_clock_ms(), 0)
    }

    /// The zero timestamp.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Produce the next reading, strictly after `self`.
    ///
    /// Uses the wall clock when it has moved past `self`, otherwise bumps the
    /// logical counter. A wall clock that steps backwards never produces a
    /// smaller reading.
    pub fn tick(&self) -> Self {
        let now_ms = wall_clock_ms();
        if now_ms > self.physical_ms {
            Self::new(now_ms, 0)
        } else if self.logical == u32::MAX {
            Self::new(self.physical_ms + 1, 0)
        } else {
            Self::new(self.physical_ms, self.logical + 1)
        }
    }

    /// Fixed-width little-endian encoding used in identifier derivation.
    pub fn to_le_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[..8].copy_from_slice(&self.physical_ms.to_le_bytes());
        out[8..].copy_from_slice(&self.logical.to_le_bytes());
        out
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms.{})", self.physical_ms, self.logical)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_ms, self.logical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_physical_first() {
        assert!(Timestamp::new(100, 9) < Timestamp::new(200, 0));
    }

    #[test]
    fn ordering_logical_second() {
        assert!(Timestamp::new(100, 1) < Timestamp::new(100, 2));
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        let ts = Timestamp::now();
        // After 2020-01-01.
        assert!(ts.physical_ms > 1_577_836_800_000);
        assert_eq!(ts.logical, 0);
    }

    #[test]
    fn tick_is_strictly_increasing() {
        let mut last = Timestamp::now();
        for _ in 0..1_000 {
            let next = last.tick();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn tick_from_future_bumps_logical() {
        let future = Timestamp::new(u64::MAX / 2, 3);
        assert_eq!(future.tick(), Timestamp::new(u64::MAX / 2, 4));
    }

    #[test]
    fn tick_rolls_over_logical() {
        let future = Timestamp::new(u64::MAX / 2, u32::MAX);
        assert_eq!(future.tick(), Timestamp::new(u64::MAX / 2 + 1, 0));
    }

    #[test]
    fn zero_is_smallest() {
        assert!(Timestamp::zero() < Timestamp::new(0, 1));
    }

    #[test]
    fn le_bytes_distinguish_fields() {
        assert_ne!(
            Timestamp::new(1, 0).to_le_bytes(),
            Timestamp::new(0, 1).to_le_bytes()
        );
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Timestamp::new(1000, 5)), "1000.5");
    }
}
