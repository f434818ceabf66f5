//! Rip-up scores: per-wire and per-net counters that escalate penalties.
//!
//! Every time a wire or net is ripped up, its score is bumped. The search
//! multiplies rip-up penalties by `1 + score`, so resources that keep
//! getting contested become progressively unattractive and the negotiation
//! converges. Scores never decrease within a routing run.

use std::collections::HashMap;
use weft_arch::{NetId, WireId};

/// Monotonically non-decreasing rip-up counters.
#[derive(Debug, Default)]
pub struct Scores {
    wire: HashMap<WireId, i32>,
    net: HashMap<NetId, i32>,
}

impl Scores {
    /// Creates zeroed scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the score of a wire.
    pub fn bump_wire(&mut self, wire: WireId) {
        *self.wire.entry(wire).or_insert(0) += 1;
    }

    /// Increments the score of a net.
    pub fn bump_net(&mut self, net: NetId) {
        *self.net.entry(net).or_insert(0) += 1;
    }

    /// Returns the score of a wire (zero if never ripped up).
    pub fn wire(&self, wire: WireId) -> i32 {
        self.wire.get(&wire).copied().unwrap_or(0)
    }

    /// Returns the score of a net (zero if never ripped up).
    pub fn net(&self, net: NetId) -> i32 {
        self.net.get(&net).copied().unwrap_or(0)
    }
}
