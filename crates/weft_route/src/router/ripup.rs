//! Rip-up: releasing wires, pips, and whole nets that block a route.
//!
//! All three entry points set the router's `ripup_flag`; the arc search
//! reads it afterwards to classify the arc as routed-with-ripup. Whatever a
//! rip-up releases must be available immediately afterwards; the call sites
//! in the search assert this, and a violation is a device-interface
//! contract breach.

use super::Router;
use weft_arch::{Device, NetId, PipId, WireId};

impl Router<'_> {
    /// Rips up a whole net: every wire in its wires map is released, every
    /// arc that referenced one of those wires is re-queued, and the net's
    /// score is bumped.
    pub(crate) fn ripup_net(&mut self, net: NetId) {
        if self.dev.debug() {
            self.log
                .line(&format!("      ripup net {}", self.dev.net_name(net)));
        }
        self.scores.bump_net(net);

        // Iterate a snapshot: unbinding mutates the net's wires map.
        let net_wires: Vec<WireId> = self.dev.net_wires(net).keys().copied().collect();
        for wire in net_wires {
            for arc in self.book.clear_wire(wire) {
                self.queue.insert(arc, &*self.dev);
            }
            if self.dev.debug() {
                self.log
                    .line(&format!("        unbind wire {}", self.dev.wire_name(wire)));
            }
            self.dev.unbind_wire(wire);
            self.scores.bump_wire(wire);
        }

        self.ripup_flag = true;
    }

    /// Releases one bound wire: re-queues its arcs, unbinds it, bumps its
    /// score.
    fn ripup_bound_wire(&mut self, wire: WireId) {
        for arc in self.book.clear_wire(wire) {
            self.queue.insert(arc, &*self.dev);
        }
        if self.dev.debug() {
            self.log
                .line(&format!("      unbind wire {}", self.dev.wire_name(wire)));
        }
        self.dev.unbind_wire(wire);
        self.scores.bump_wire(wire);
    }

    /// Frees whatever blocks `wire`: the aliased owning wire if the fabric
    /// reports one, otherwise the owning net.
    pub(crate) fn ripup_wire(&mut self, wire: WireId) {
        if self.dev.debug() {
            self.log
                .line(&format!("    ripup wire {}", self.dev.wire_name(wire)));
        }

        match self.dev.conflicting_wire_wire(wire) {
            Some(owner) => self.ripup_bound_wire(owner),
            None => {
                if let Some(net) = self.dev.conflicting_wire_net(wire) {
                    self.ripup_net(net);
                }
            }
        }

        self.ripup_flag = true;
    }

    /// Frees whatever blocks `pip`: the owning wire if the fabric reports
    /// one, otherwise the owning net.
    pub(crate) fn ripup_pip(&mut self, pip: PipId) {
        if self.dev.debug() {
            self.log
                .line(&format!("    ripup pip {}", self.dev.pip_name(pip)));
        }

        match self.dev.conflicting_pip_wire(pip) {
            Some(owner) => self.ripup_bound_wire(owner),
            None => {
                if let Some(net) = self.dev.conflicting_pip_net(pip) {
                    self.ripup_net(net);
                }
            }
        }

        self.ripup_flag = true;
    }
}
