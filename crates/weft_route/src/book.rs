//! The bidirectional index of wires bound per arc and arcs bound per wire.
//!
//! [`ArcBook`] is the router's private bookkeeping for safe rip-up: given a
//! wire about to be released, it answers which arcs lose routing and must be
//! re-queued; given an arc about to be re-routed, it answers which wires the
//! arc currently occupies. The two maps are strict inverses of each other
//! after every operation.

use crate::arc::Arc;
use std::collections::{HashMap, HashSet};
use weft_arch::WireId;

/// Mirrored wire-to-arcs and arc-to-wires maps.
///
/// Neither map owns the wires or arcs; both store value-typed handles.
/// Callers are responsible for releasing the device binding of a wire once
/// its arc set becomes empty ([`unbind`](Self::unbind) reports this).
#[derive(Debug, Default)]
pub struct ArcBook {
    wire_to_arcs: HashMap<WireId, HashSet<Arc>>,
    arc_to_wires: HashMap<Arc, HashSet<WireId>>,
}

impl ArcBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `arc` occupies `wire`.
    pub fn bind(&mut self, arc: Arc, wire: WireId) {
        self.wire_to_arcs.entry(wire).or_default().insert(arc);
        self.arc_to_wires.entry(arc).or_default().insert(wire);
    }

    /// Removes the `arc`/`wire` association from both maps.
    ///
    /// Returns `true` if the wire's arc set became empty, in which case the
    /// caller must release the wire's device binding.
    pub fn unbind(&mut self, arc: Arc, wire: WireId) -> bool {
        let arcs = self
            .wire_to_arcs
            .get_mut(&wire)
            .unwrap_or_else(|| panic!("unbind: wire {wire} has no arc entries"));
        assert!(arcs.remove(&arc), "unbind: {arc} does not occupy wire {wire}");
        let wire_empty = arcs.is_empty();
        if wire_empty {
            self.wire_to_arcs.remove(&wire);
        }
        if let Some(wires) = self.arc_to_wires.get_mut(&arc) {
            wires.remove(&wire);
            if wires.is_empty() {
                self.arc_to_wires.remove(&arc);
            }
        }
        wire_empty
    }

    /// Removes every association of `wire`, returning the arcs that lost it.
    ///
    /// Used by rip-up: each returned arc must be re-queued for routing.
    pub fn clear_wire(&mut self, wire: WireId) -> Vec<Arc> {
        let arcs: Vec<Arc> = match self.wire_to_arcs.remove(&wire) {
            Some(set) => set.into_iter().collect(),
            None => Vec::new(),
        };
        for &arc in &arcs {
            if let Some(wires) = self.arc_to_wires.get_mut(&arc) {
                wires.remove(&wire);
                if wires.is_empty() {
                    self.arc_to_wires.remove(&arc);
                }
            }
        }
        arcs
    }

    /// Returns a snapshot of the wires currently occupied by `arc`.
    pub fn wires_of(&self, arc: Arc) -> Vec<WireId> {
        self.arc_to_wires
            .get(&arc)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns a snapshot of the arcs currently occupying `wire`.
    pub fn arcs_of(&self, wire: WireId) -> Vec<Arc> {
        self.wire_to_arcs
            .get(&wire)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns whether `arc` occupies `wire`.
    pub fn contains(&self, arc: Arc, wire: WireId) -> bool {
        self.wire_to_arcs
            .get(&wire)
            .is_some_and(|set| set.contains(&arc))
    }

    /// Returns a snapshot of every arc with at least one wire.
    pub fn arcs(&self) -> Vec<Arc> {
        self.arc_to_wires.keys().copied().collect()
    }

    /// Returns a snapshot of every wire with at least one arc.
    pub fn bound_wires(&self) -> Vec<WireId> {
        self.wire_to_arcs.keys().copied().collect()
    }

    /// Returns whether the book holds no associations at all.
    pub fn is_empty(&self) -> bool {
        self.arc_to_wires.is_empty() && self.wire_to_arcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_arch::NetId;

    fn arc(net: u32, sink: usize) -> Arc {
        Arc::new(NetId::from_raw(net), sink)
    }

    fn wire(raw: u32) -> WireId {
        WireId::from_raw(raw)
    }

    /// Asserts the two maps are strict inverses of each other.
    fn assert_inverse(book: &ArcBook) {
        for (w, arcs) in &book.wire_to_arcs {
            assert!(!arcs.is_empty());
            for a in arcs {
                assert!(book.arc_to_wires[a].contains(w));
            }
        }
        for (a, wires) in &book.arc_to_wires {
            assert!(!wires.is_empty());
            for w in wires {
                assert!(book.wire_to_arcs[w].contains(a));
            }
        }
    }

    #[test]
    fn bind_is_symmetric() {
        let mut book = ArcBook::new();
        book.bind(arc(0, 0), wire(5));
        assert!(book.contains(arc(0, 0), wire(5)));
        assert_eq!(book.wires_of(arc(0, 0)), vec![wire(5)]);
        assert_eq!(book.arcs_of(wire(5)), vec![arc(0, 0)]);
        assert_inverse(&book);
    }

    #[test]
    fn unbind_reports_empty_wire() {
        let mut book = ArcBook::new();
        book.bind(arc(0, 0), wire(5));
        book.bind(arc(0, 1), wire(5));
        assert!(!book.unbind(arc(0, 0), wire(5)));
        assert_inverse(&book);
        assert!(book.unbind(arc(0, 1), wire(5)));
        assert!(book.is_empty());
    }

    #[test]
    #[should_panic(expected = "does not occupy")]
    fn unbind_missing_panics() {
        let mut book = ArcBook::new();
        book.bind(arc(0, 1), wire(5));
        book.unbind(arc(0, 0), wire(5));
    }

    #[test]
    fn clear_wire_returns_displaced_arcs() {
        let mut book = ArcBook::new();
        book.bind(arc(0, 0), wire(5));
        book.bind(arc(0, 1), wire(5));
        book.bind(arc(0, 0), wire(6));
        let mut displaced = book.clear_wire(wire(5));
        displaced.sort_by_key(|a| a.sink);
        assert_eq!(displaced, vec![arc(0, 0), arc(0, 1)]);
        // arc(0,0) keeps wire 6; arc(0,1) has nothing left.
        assert_eq!(book.wires_of(arc(0, 0)), vec![wire(6)]);
        assert!(book.wires_of(arc(0, 1)).is_empty());
        assert_inverse(&book);
    }

    #[test]
    fn clear_unknown_wire_is_empty() {
        let mut book = ArcBook::new();
        assert!(book.clear_wire(wire(9)).is_empty());
    }

    #[test]
    fn snapshots_of_unknown_entries_are_empty() {
        let book = ArcBook::new();
        assert!(book.wires_of(arc(3, 0)).is_empty());
        assert!(book.arcs_of(wire(3)).is_empty());
        assert!(!book.contains(arc(3, 0), wire(3)));
    }

    #[test]
    fn inverse_invariant_under_random_operations() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut book = ArcBook::new();
        for _ in 0..500 {
            let a = arc(rng.gen_range(0..4), rng.gen_range(0..3));
            let w = wire(rng.gen_range(0..10));
            match rng.gen_range(0..3) {
                0 => book.bind(a, w),
                1 => {
                    if book.contains(a, w) {
                        book.unbind(a, w);
                    }
                }
                _ => {
                    book.clear_wire(w);
                }
            }
            assert_inverse(&book);
        }
    }
}
