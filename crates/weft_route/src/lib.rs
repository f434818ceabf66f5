//! Weft: a detailed router for placed FPGA netlists.
//!
//! Given a device ([`weft_arch::Device`]) and a placed design — nets with a
//! driver wire and one or more budgeted sink wires — the router assigns a
//! legal, non-overlapping set of wires and pips to every arc (driver-to-sink
//! connection). Two cooperating mechanisms do the hard work:
//!
//! 1. a per-arc A*-style search over the implicit wire/pip graph, with
//!    delay, reuse bonuses and rip-up penalties folded into one cost
//!    function; and
//! 2. a negotiated-congestion outer loop: routing an arc may rip up routes
//!    in its way, displaced arcs are re-queued, and per-resource scores
//!    escalate the penalty on repeatedly contested resources until the
//!    negotiation converges.
//!
//! [`route_design`] is the entry point; [`check_routed_design`] is the
//! post-route structural validator.
//!
//! # Usage
//!
//! ```
//! use weft_arch::DeviceBuilder;
//! use weft_diagnostics::DiagnosticSink;
//! use weft_route::{route_design, RouteLog, RouterConfig};
//!
//! let mut b = DeviceBuilder::new();
//! let src = b.wire("src", 0, 0, 10);
//! let dst = b.wire("dst", 1, 0, 10);
//! b.pip(src, dst, 25);
//! b.net("n", Some(src), &[(dst, 0)]);
//! let mut dev = b.build();
//!
//! let sink = DiagnosticSink::new();
//! let mut log = RouteLog::discard();
//! assert!(route_design(&mut dev, &RouterConfig::default(), &sink, &mut log));
//! ```

#![warn(missing_docs)]

pub mod arc;
pub mod book;
pub mod cfg;
pub mod log;
pub mod queue;
mod router;
pub mod scores;
pub mod validate;

pub use arc::Arc;
pub use book::ArcBook;
pub use cfg::{ConfigError, CostModel, RouterConfig};
pub use log::RouteLog;
pub use queue::ArcQueue;
pub use router::route_design;
pub use scores::Scores;
pub use validate::check_routed_design;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Router;
    use std::io::{self, Write};
    use std::sync::{Arc as StdArc, Mutex};
    use weft_arch::{BindStrength, Device, DeviceBuilder, GenericDevice, NetId, WireId};
    use weft_diagnostics::DiagnosticSink;

    #[derive(Clone, Default)]
    struct SharedBuf(StdArc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn route(dev: &mut GenericDevice) -> (bool, DiagnosticSink, String) {
        let sink = DiagnosticSink::new();
        let buf = SharedBuf::default();
        let mut log = RouteLog::new(Box::new(buf.clone()));
        let ok = route_design(dev, &RouterConfig::default(), &sink, &mut log);
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        (ok, sink, text)
    }

    /// Two nets with disjoint straight-line routes.
    fn disjoint_pair(seed: u64) -> GenericDevice {
        let mut b = DeviceBuilder::new();
        b.seed(seed);
        let w00 = b.wire("w00", 0, 0, 10);
        let w01 = b.wire("w01", 0, 1, 10);
        let w02 = b.wire("w02", 0, 2, 10);
        let w10 = b.wire("w10", 1, 0, 10);
        let w11 = b.wire("w11", 1, 1, 10);
        let w12 = b.wire("w12", 1, 2, 10);
        b.pip(w00, w01, 20);
        b.pip(w01, w02, 20);
        b.pip(w10, w11, 20);
        b.pip(w11, w12, 20);
        b.net("a", Some(w00), &[(w02, 0)]);
        b.net("b", Some(w10), &[(w12, 0)]);
        b.build()
    }

    #[test]
    fn two_nets_route_cleanly() {
        let mut dev = disjoint_pair(1);
        let (ok, sink, text) = route(&mut dev);
        assert!(ok);
        assert!(!sink.has_errors());
        assert!(sink.diagnostics().is_empty());
        assert!(text.contains("Routing 2 arcs."));
        assert!(text.contains("Routing complete."));
        assert!(text.contains("Checksum: 0x"));
        let mut log = RouteLog::discard();
        assert!(check_routed_design(&dev, &mut log));
    }

    #[test]
    fn bottleneck_forces_ripup() {
        // net "first" can reach d1 through the shared wire `a` (short) or
        // the detour `e` (long); net "second" can only go through `a`.
        let mut b = DeviceBuilder::new();
        let s1 = b.wire("s1", 0, 0, 10);
        let s2 = b.wire("s2", 0, 2, 10);
        let a = b.wire("a", 1, 1, 10);
        let e = b.wire("e", 1, 0, 10);
        let d1 = b.wire("d1", 2, 0, 10);
        let d2 = b.wire("d2", 2, 2, 10);
        b.pip(s1, a, 10);
        b.pip(a, d1, 10);
        b.pip(s2, a, 10);
        b.pip(a, d2, 10);
        b.pip(s1, e, 50);
        b.pip(e, d1, 50);
        b.estimate_unit(1);
        // The generous budget routes "first" first; "second" then has to
        // fight it for the bottleneck.
        let n1 = b.net("first", Some(s1), &[(d1, 1_000)]);
        let n2 = b.net("second", Some(s2), &[(d2, 0)]);
        let mut dev = b.build();

        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        assert!(router.drain());
        assert!(router.arcs_with_ripup >= 1);
        assert!(router.scores.wire(a) >= 1);
        assert!(!sink.has_errors());

        // Both nets are routed; only "second" holds the bottleneck.
        assert!(dev.net_wires(n2).contains_key(&a));
        assert!(!dev.net_wires(n1).contains_key(&a));
        assert!(dev.net_wires(n1).contains_key(&e));
        let mut vlog = RouteLog::discard();
        assert!(check_routed_design(&dev, &mut vlog));
    }

    #[test]
    fn unrouteable_sink_aborts_with_a_warning() {
        let mut b = DeviceBuilder::new();
        let s = b.wire("s", 0, 0, 10);
        let lonely = b.wire("lonely", 3, 3, 10);
        b.net("stuck", Some(s), &[(lonely, 0)]);
        let mut dev = b.build();

        let (ok, sink, _) = route(&mut dev);
        assert!(!ok);
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert!(diags[0]
            .message
            .contains("failed to find a route for arc 0 of net stuck"));
    }

    #[test]
    fn pre_routed_input_is_preserved() {
        let mut b = DeviceBuilder::new();
        let w0 = b.wire("w0", 0, 0, 10);
        let w1 = b.wire("w1", 1, 0, 10);
        b.pip(w0, w1, 20);
        let n = b.net("n", Some(w0), &[(w1, 0)]);
        let mut dev = b.build();
        let p = dev.downhill_pips(w0)[0];
        dev.bind_wire(w0, n, BindStrength::Weak);
        dev.bind_pip(p, n, BindStrength::Weak);
        let checksum_before = dev.checksum();

        let (ok, sink, text) = route(&mut dev);
        assert!(ok);
        assert!(!sink.has_errors());
        assert!(text.contains("Routing 0 arcs."));
        assert_eq!(dev.checksum(), checksum_before);
    }

    #[test]
    fn global_nets_are_left_alone() {
        let mut b = DeviceBuilder::new();
        let gs = b.wire("gs", 0, 0, 10);
        let gd = b.wire("gd", 1, 0, 10);
        b.pip(gs, gd, 20);
        let g = b.net("gclk", Some(gs), &[(gd, 0)]);
        b.mark_global(g);
        let s = b.wire("s", 0, 1, 10);
        let d = b.wire("d", 1, 1, 10);
        b.pip(s, d, 20);
        b.net("data", Some(s), &[(d, 0)]);
        let mut dev = b.build();
        // A deliberately partial binding the router must not touch.
        dev.bind_wire(gs, g, BindStrength::Weak);

        let (ok, sink, text) = route(&mut dev);
        assert!(ok);
        assert!(!sink.has_errors());
        assert!(text.contains("Routing 1 arcs."));
        assert!(!dev.check_wire_avail(gs), "global binding must survive");
        assert!(dev.check_wire_avail(gd), "router must not extend global nets");
    }

    #[test]
    fn topology_error_fails_before_routing() {
        let mut b = DeviceBuilder::new();
        let s = b.wire("s", 0, 0, 10);
        let d0 = b.wire("d0", 1, 0, 10);
        let d1 = b.wire("d1", 1, 1, 10);
        b.net("a", Some(s), &[(d0, 0)]);
        b.net("b", Some(s), &[(d1, 0)]);
        let mut dev = b.build();

        let (ok, sink, _) = route(&mut dev);
        assert!(!ok);
        assert!(sink.has_errors());
    }

    #[test]
    fn identical_seeds_give_identical_checksums() {
        let mut first = disjoint_pair(99);
        let mut second = disjoint_pair(99);
        assert!(route(&mut first).0);
        assert!(route(&mut second).0);
        assert_eq!(first.checksum(), second.checksum());
    }

    #[test]
    fn setup_claims_form_a_connected_path() {
        // After setup on a pre-routed net, the claimed wires walk back from
        // the sink to the source through the recorded pips.
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

        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();

        let claimed = router.book.wires_of(crate::arc::Arc::new(n, 0));
        // Walk from the sink via recorded pips; every step must be claimed.
        let mut cursor = w2;
        let mut steps = 0;
        while cursor != w0 {
            assert!(claimed.contains(&cursor));
            let pip = router.dev.net_wires(n)[&cursor].pip.unwrap();
            cursor = router.dev.pip_src(pip);
            steps += 1;
            assert!(steps <= claimed.len(), "walk must terminate");
        }
        assert!(claimed.contains(&w0));
    }

    #[test]
    fn ripped_up_net_reroutes_to_a_legal_binding() {
        let mut dev = disjoint_pair(5);
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        assert!(router.drain());

        // Rip one net out entirely, then let the loop reroute it.
        let net = NetId::from_raw(0);
        router.ripup_net(net);
        assert!(!router.dev.net_wires(net).contains_key(&WireId::from_raw(0)));
        assert!(router.drain());
        assert!(!router.dev.net_wires(net).is_empty());

        let mut vlog = RouteLog::discard();
        assert!(check_routed_design(&dev, &mut vlog));
    }

    #[test]
    fn parallel_rows_route_and_validate() {
        // Five nets on parallel rows of a grid, feasible by construction.
        let mut b = DeviceBuilder::new();
        b.seed(1234);
        let cols = 5;
        let rows = 5;
        let mut grid = Vec::new();
        for y in 0..rows {
            let mut row = Vec::new();
            for x in 0..cols {
                row.push(b.wire(&format!("w{x}_{y}"), x, y, 10));
            }
            grid.push(row);
        }
        for y in 0..rows as usize {
            for x in 0..cols as usize {
                if x + 1 < cols as usize {
                    b.pip(grid[y][x], grid[y][x + 1], 20);
                    b.pip(grid[y][x + 1], grid[y][x], 20);
                }
                if y + 1 < rows as usize {
                    b.pip(grid[y][x], grid[y + 1][x], 20);
                    b.pip(grid[y + 1][x], grid[y][x], 20);
                }
            }
        }
        for y in 0..rows as usize {
            b.net(
                &format!("row{y}"),
                Some(grid[y][0]),
                &[(grid[y][cols as usize - 1], (y as i64) * 100)],
            );
        }
        let mut dev = b.build();

        let (ok, sink, _) = route(&mut dev);
        assert!(ok);
        assert!(!sink.has_errors());
        let mut vlog = RouteLog::discard();
        assert!(check_routed_design(&dev, &mut vlog));
    }
}
