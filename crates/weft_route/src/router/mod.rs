//! The router proper: state, outer loop, and the public entry point.
//!
//! [`route_design`] drives the whole pipeline: setup ingests any existing
//! binding and seeds the arc queue, then the outer loop drains the queue by
//! routing one arc at a time with rip-up enabled. Rip-up re-queues displaced
//! arcs; score-driven penalty escalation makes repeatedly contested
//! resources progressively unattractive until the negotiation converges.

mod check;
mod ripup;
mod search;
mod setup;

pub(crate) use search::QueuedWire;

use crate::book::ArcBook;
use crate::cfg::{CostModel, RouterConfig};
use crate::log::RouteLog;
use crate::queue::ArcQueue;
use crate::scores::Scores;
use std::collections::{BinaryHeap, HashMap};
use weft_arch::{Device, NetId, WireId};
use weft_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

/// Router state for one routing call.
///
/// Owns the arc bookkeeping, the pending-arc queue, the rip-up scores, and
/// the per-search scratch containers (reused across searches, cleared at the
/// start of each).
pub(crate) struct Router<'a> {
    pub(crate) dev: &'a mut dyn Device,
    pub(crate) cfg: &'a RouterConfig,
    pub(crate) cost: CostModel,
    pub(crate) book: ArcBook,
    pub(crate) queue: ArcQueue,
    pub(crate) scores: Scores,
    pub(crate) visited: HashMap<WireId, QueuedWire>,
    pub(crate) frontier: BinaryHeap<QueuedWire>,
    pub(crate) arcs_with_ripup: u64,
    pub(crate) arcs_without_ripup: u64,
    pub(crate) ripup_flag: bool,
    pub(crate) sink: &'a DiagnosticSink,
    pub(crate) log: &'a mut RouteLog,
}

impl<'a> Router<'a> {
    pub(crate) fn new(
        dev: &'a mut dyn Device,
        cfg: &'a RouterConfig,
        sink: &'a DiagnosticSink,
        log: &'a mut RouteLog,
    ) -> Self {
        let cost = CostModel::from_device(&*dev);
        Self {
            dev,
            cfg,
            cost,
            book: ArcBook::new(),
            queue: ArcQueue::new(),
            scores: Scores::new(),
            visited: HashMap::new(),
            frontier: BinaryHeap::new(),
            arcs_with_ripup: 0,
            arcs_without_ripup: 0,
            ripup_flag: false,
            sink,
            log,
        }
    }

    /// Returns whether the net is outside the router's responsibility:
    /// driverless, or flagged architecture-global.
    pub(crate) fn skip_net(&self, net: NetId) -> bool {
        self.dev.is_global(net) || !self.dev.has_driver(net)
    }

    /// Drains the arc queue, routing every pending arc with rip-up enabled.
    ///
    /// Returns `false` if an arc could not be routed or the configured
    /// iteration cap was exhausted; the failed arc is named in a diagnostic.
    pub(crate) fn drain(&mut self) -> bool {
        let mut iter_cnt: u64 = 0;
        let mut last_with: u64 = 0;
        let mut last_without: u64 = 0;

        self.log
            .line("           |   (re-)routed arcs  |   delta    | remaining");
        self.log
            .line("   IterCnt |  w/ripup   wo/ripup |  w/r  wo/r |      arcs");

        while !self.queue.is_empty() {
            iter_cnt += 1;

            if self.cfg.max_iter_cnt != 0 && iter_cnt > self.cfg.max_iter_cnt {
                self.sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::new(Category::Routing, 202),
                        format!(
                            "routing did not converge after {} iterations",
                            self.cfg.max_iter_cnt
                        ),
                    )
                    .with_note(format!(
                        "{} arcs remain in the routing queue",
                        self.queue.len()
                    )),
                );
                return false;
            }

            if iter_cnt % 1000 == 0 {
                self.progress_row(iter_cnt, last_with, last_without);
                last_with = self.arcs_with_ripup;
                last_without = self.arcs_without_ripup;
                self.check();
            }

            let arc = match self.queue.pop() {
                Some(arc) => arc,
                None => break,
            };

            if self.dev.debug() {
                self.log.line(&format!("-- {iter_cnt} --"));
            }

            if !self.route_arc(arc, true) {
                self.sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Routing, 201),
                    format!(
                        "failed to find a route for arc {} of net {}",
                        arc.sink,
                        self.dev.net_name(arc.net)
                    ),
                ));
                self.check();
                return false;
            }
        }

        self.progress_row(iter_cnt, last_with, last_without);
        self.log.line("Routing complete.");
        true
    }

    fn progress_row(&mut self, iter_cnt: u64, last_with: u64, last_without: u64) {
        self.log.line(&format!(
            "{:10} | {:8} {:10} | {:4} {:5} | {:9}",
            iter_cnt,
            self.arcs_with_ripup,
            self.arcs_without_ripup,
            self.arcs_with_ripup - last_with,
            self.arcs_without_ripup - last_without,
            self.queue.len()
        ));
    }
}

/// Routes every arc of the design, honouring per-sink timing budgets.
///
/// Ingests any routing already present in the device's binding state, then
/// routes all remaining arcs with rip-up and reroute. On success the binding
/// state holds a legal, loop-free routing for every non-skipped net and the
/// final checksum is written to the log.
///
/// Returns `false` on the first unrouteable arc, on netlist topology errors,
/// or on cap exhaustion; details are reported through `sink`.
pub fn route_design(
    dev: &mut dyn Device,
    cfg: &RouterConfig,
    sink: &DiagnosticSink,
    log: &mut RouteLog,
) -> bool {
    log.line("Routing..");
    log.line("Setting up routing queue.");

    let mut router = Router::new(dev, cfg, sink, log);
    router.setup();
    if router.sink.has_errors() {
        return false;
    }
    router.check();

    let arcs = router.queue.len();
    router.log.line(&format!("Routing {arcs} arcs."));

    if !router.drain() {
        return false;
    }
    router.check();

    #[cfg(any(debug_assertions, feature = "strict-checks"))]
    assert!(
        crate::validate::check_routed_design(router.dev, router.log),
        "routing completed but the binding state failed structural validation"
    );

    let checksum = router.dev.checksum();
    router.log.line(&format!("Checksum: {checksum}"));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::Arc;
    use weft_arch::DeviceBuilder;

    /// Two nets on a small grid with disjoint routes.
    fn disjoint_pair() -> (weft_arch::GenericDevice, Arc, Arc) {
        let mut b = DeviceBuilder::new();
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
        let a = b.net("a", Some(w00), &[(w02, 0)]);
        let bnet = b.net("b", Some(w10), &[(w12, 0)]);
        (b.build(), Arc::new(a, 0), Arc::new(bnet, 0))
    }

    #[test]
    fn drain_counts_clean_arcs() {
        let (mut dev, _, _) = disjoint_pair();
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        assert!(router.drain());
        assert_eq!(router.arcs_with_ripup, 0);
        assert_eq!(router.arcs_without_ripup, 2);
        assert!(router.queue.is_empty());
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let (mut dev, _, _) = disjoint_pair();
        let cfg = RouterConfig {
            max_iter_cnt: 1,
            ..RouterConfig::default()
        };
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let mut router = Router::new(&mut dev, &cfg, &sink, &mut log);
        router.setup();
        assert!(!router.drain());
        let diags = sink.take_all();
        assert!(diags
            .iter()
            .any(|d| d.message.contains("did not converge")));
    }

    #[test]
    fn skip_net_rules() {
        let mut b = DeviceBuilder::new();
        let w = b.wire("w", 0, 0, 0);
        let d = b.wire("d", 1, 0, 0);
        let normal = b.net("n", Some(w), &[(d, 0)]);
        let floating = b.net("f", None, &[(d, 0)]);
        let global = b.net("clk", Some(w), &[]);
        b.mark_global(global);
        let mut dev = b.build();
        let cfg = RouterConfig::default();
        let sink = DiagnosticSink::new();
        let mut log = RouteLog::discard();
        let router = Router::new(&mut dev, &cfg, &sink, &mut log);
        assert!(!router.skip_net(normal));
        assert!(router.skip_net(floating));
        assert!(router.skip_net(global));
    }
}
