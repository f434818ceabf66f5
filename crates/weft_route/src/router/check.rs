//! The structural invariant pass over the router's bookkeeping.
//!
//! Compiled in under `debug_assertions` or the `strict-checks` feature, so
//! production builds can keep it without enabling debug codegen. In other
//! builds `check()` compiles to nothing.

use super::Router;

#[cfg(any(debug_assertions, feature = "strict-checks"))]
use {
    crate::arc::Arc,
    std::collections::HashSet,
    weft_arch::{BindStrength, Device, WireId},
};

impl Router<'_> {
    /// Asserts that the arc book, the device binding state, and the netlist
    /// agree: every book entry names a real arc, every wire a book entry
    /// claims is bound to the arc's net, and every non-locked bound wire is
    /// claimed by at least one arc.
    #[cfg(any(debug_assertions, feature = "strict-checks"))]
    pub(crate) fn check(&self) {
        let mut valid_arcs: HashSet<Arc> = HashSet::new();

        for net in self.dev.nets() {
            if self.skip_net(net) {
                continue;
            }
            let mut valid_wires_for_net: HashSet<WireId> = HashSet::new();

            assert!(
                self.dev.source_wire(net).is_some(),
                "net {} has no source wire",
                self.dev.net_name(net)
            );

            for sink_idx in 0..self.dev.sink_count(net) {
                assert!(
                    self.dev.sink_wire(net, sink_idx).is_some(),
                    "sink {} of net {} has no wire",
                    sink_idx,
                    self.dev.net_name(net)
                );
                let arc = Arc::new(net, sink_idx);
                valid_arcs.insert(arc);

                for wire in self.book.wires_of(arc) {
                    valid_wires_for_net.insert(wire);
                    assert!(
                        self.book.arcs_of(wire).contains(&arc),
                        "book maps are out of sync at wire {}",
                        self.dev.wire_name(wire)
                    );
                    assert!(
                        self.dev.net_wires(net).contains_key(&wire),
                        "wire {} claimed by {} is not bound to net {}",
                        self.dev.wire_name(wire),
                        arc,
                        self.dev.net_name(net)
                    );
                }
            }

            for (&wire, binding) in self.dev.net_wires(net) {
                if binding.strength < BindStrength::Locked {
                    assert!(
                        valid_wires_for_net.contains(&wire),
                        "bound wire {} of net {} belongs to no arc",
                        self.dev.wire_name(wire),
                        self.dev.net_name(net)
                    );
                }
            }
        }

        for wire in self.book.bound_wires() {
            for arc in self.book.arcs_of(wire) {
                assert!(valid_arcs.contains(&arc), "book names unknown arc {arc}");
            }
        }
        for arc in self.book.arcs() {
            assert!(valid_arcs.contains(&arc), "book names unknown arc {arc}");
        }
    }

    #[cfg(not(any(debug_assertions, feature = "strict-checks")))]
    pub(crate) fn check(&self) {}
}

#[cfg(all(test, any(debug_assertions, feature = "strict-checks")))]
mod tests {
    use crate::arc::Arc;
    use crate::cfg::RouterConfig;
    use crate::log::RouteLog;
    use crate::router::Router;
    use weft_arch::{BindStrength, Device, DeviceBuilder, NetId, WireId};
    use weft_diagnostics::DiagnosticSink;

    fn routed_chain() -> weft_arch::GenericDevice {
        let mut b = DeviceBuilder::new();
        let w0 = b.wire("w0", 0, 0, 10);
        let w1 = b.wire("w1", 1, 0, 10);
        let w2 = b.wire("w2", 2, 0, 10);
        b.pip(w0, w1, 20);
        b.pip(w1, w2, 20);
        let n = b.net("n", Some(w0), &[(w2, 0)]);
        let mut dev = b.build();
        let p01 = dev.downhill_pips(w0)[0];
        let p12 = dev.downhill_pips(w1)[0];
        dev.bind_wire(w0, n, BindStrength::Weak);
        dev.bind_pip(p01, n, BindStrength::Weak);
        dev.bind_pip(p12, n, BindStrength::Weak);
        dev
    }

    #[test]
    fn check_passes_after_setup() {
        let mut dev = routed_chain();
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        router.check();
    }

    #[test]
    #[should_panic(expected = "unknown arc")]
    fn check_catches_stale_book_entries() {
        let mut dev = routed_chain();
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        // An arc that does not exist in the netlist.
        router
            .book
            .bind(Arc::new(NetId::from_raw(7), 3), WireId::from_raw(0));
        router.check();
    }

    #[test]
    #[should_panic(expected = "is not bound to net")]
    fn check_catches_unbound_claimed_wire() {
        let mut dev = routed_chain();
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        // Unbind a wire behind the book's back.
        router.dev.unbind_wire(WireId::from_raw(1));
        router.check();
    }
}
