//! The priority queue of arcs awaiting (re)routing.
//!
//! Arcs are keyed by `pri = estimate(src, dst) − budget` and popped in
//! ascending order: the arc whose estimate sits furthest under its budget
//! is routed first, leaving the tightly budgeted arcs to route later, when
//! they can rip cheaper routes out of their way. A companion membership set
//! keeps each arc in the queue at most once, however many times rip-up
//! tries to re-queue it.

use crate::arc::Arc;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use weft_arch::{Device, WireId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArcEntry {
    arc: Arc,
    pri: i64,
}

impl Ord for ArcEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for a min-heap on pri. The arc fields only make the
        // order total; the outer loop does not depend on tie order.
        other
            .pri
            .cmp(&self.pri)
            .then_with(|| other.arc.net.cmp(&self.arc.net))
            .then_with(|| other.arc.sink.cmp(&self.arc.sink))
    }
}

impl PartialOrd for ArcEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-priority queue of arcs keyed by delay slack.
#[derive(Debug, Default)]
pub struct ArcQueue {
    heap: BinaryHeap<ArcEntry>,
    queued: HashSet<Arc>,
}

impl ArcQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an arc, resolving its source and sink wires from the device.
    ///
    /// Duplicate insertions are suppressed. Panics if the device cannot
    /// resolve the wires; by the time arcs are queued, setup has verified
    /// they exist.
    pub fn insert(&mut self, arc: Arc, dev: &dyn Device) {
        if self.queued.contains(&arc) {
            return;
        }
        let src = dev
            .source_wire(arc.net)
            .unwrap_or_else(|| panic!("queue insert: no source wire for {arc}"));
        let dst = dev
            .sink_wire(arc.net, arc.sink)
            .unwrap_or_else(|| panic!("queue insert: no sink wire for {arc}"));
        self.insert_with_wires(arc, src, dst, dev);
    }

    /// Inserts an arc with pre-resolved wires.
    ///
    /// Used during setup, when the device binding state does not yet
    /// reflect the source. Duplicate insertions are suppressed.
    pub fn insert_with_wires(&mut self, arc: Arc, src: WireId, dst: WireId, dev: &dyn Device) {
        if !self.queued.insert(arc) {
            return;
        }
        let pri = dev.estimate(src, dst) - dev.sink_budget(arc.net, arc.sink);
        self.heap.push(ArcEntry { arc, pri });
    }

    /// Removes and returns the arc with the smallest priority value.
    pub fn pop(&mut self) -> Option<Arc> {
        let entry = self.heap.pop()?;
        self.queued.remove(&entry.arc);
        Some(entry.arc)
    }

    /// Returns the number of queued arcs.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns whether the arc is currently queued.
    pub fn contains(&self, arc: Arc) -> bool {
        self.queued.contains(&arc)
    }
}
