//! State fingerprinting for routing-result checksums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-bit fingerprint of router or device state, computed with XXH3.
///
/// Printed at the end of a successful routing run so two runs over the same
/// design can be compared at a glance. Callers are responsible for feeding
/// bytes in a canonical (sorted) order; the hash itself is order-sensitive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHash(u32);

impl StateHash {
    /// Computes a fingerprint from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let wide = xxhash_rust::xxh3::xxh3_64(data);
        Self((wide ^ (wide >> 32)) as u32)
    }

    /// Returns the raw 32-bit value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::Debug for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateHash({:#010x})", self.0)
    }
}
