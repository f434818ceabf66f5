//! The per-arc A* search and backtrack-and-bind.
//!
//! The search expands the implicit wire/pip graph from the arc's source
//! wire. Each frontier entry carries its cost split four ways: accumulated
//! `delay`, accumulated rip-up `penalty`, accumulated reuse `bonus`, and the
//! heuristic estimate `togo` to the sink. The heap key is
//! `delay + penalty + togo − bonus`; exact ties are broken by the device's
//! random tag so equal-cost routes spread instead of piling up.
//!
//! Rip-up is folded into the cost function rather than performed during the
//! search: a conflicting resource adds a score-scaled penalty, and only if
//! the winning path still crosses it does the backtrack actually rip it up.

use super::Router;
use crate::arc::Arc;
use std::cmp::Ordering;
use weft_arch::{BindStrength, Device, NetId, PipId, WireId};

/// One search-frontier entry: a wire reached through a pip.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueuedWire {
    pub(crate) wire: WireId,
    pub(crate) pip: Option<PipId>,
    pub(crate) delay: i64,
    pub(crate) penalty: i64,
    pub(crate) bonus: i64,
    pub(crate) togo: i64,
    pub(crate) randtag: i32,
}

impl QueuedWire {
    fn heap_key(&self) -> i64 {
        debug_assert!(self.delay + self.penalty + self.togo >= 0);
        self.delay + self.penalty + self.togo - self.bonus
    }
}

impl PartialEq for QueuedWire {
    fn eq(&self, other: &Self) -> bool {
        self.heap_key() == other.heap_key() && self.randtag == other.randtag
    }
}

impl Eq for QueuedWire {}

impl Ord for QueuedWire {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for a min-heap; on exact key ties the smaller
        // randtag pops first.
        other
            .heap_key()
            .cmp(&self.heap_key())
            .then_with(|| other.randtag.cmp(&self.randtag))
    }
}

impl PartialOrd for QueuedWire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reconciles the wire-level and pip-level conflict reports for one
/// candidate step so no resource is penalised (or later ripped up) twice.
fn deconflict(
    dev: &dyn Device,
    conflict_wire_wire: &mut Option<WireId>,
    conflict_wire_net: &mut Option<NetId>,
    conflict_pip_wire: &mut Option<WireId>,
    conflict_pip_net: &mut Option<NetId>,
) {
    // A conflicting pip wire already covered by the conflicting net (and
    // vice versa) would be released by the net rip-up anyway.
    if let (Some(cwn), Some(cpw)) = (*conflict_wire_net, *conflict_pip_wire) {
        if dev.net_wires(cwn).contains_key(&cpw) {
            *conflict_pip_wire = None;
        }
    }
    if let (Some(cpn), Some(cww)) = (*conflict_pip_net, *conflict_wire_wire) {
        if dev.net_wires(cpn).contains_key(&cww) {
            *conflict_wire_wire = None;
        }
    }
    if *conflict_wire_wire == *conflict_pip_wire {
        *conflict_wire_wire = None;
    }
    if *conflict_wire_net == *conflict_pip_net {
        *conflict_wire_net = None;
    }
}

impl Router<'_> {
    /// Routes one arc from its net's source wire to its sink wire.
    ///
    /// With `ripup` enabled, occupied resources stay expandable at a
    /// score-scaled penalty and are ripped up during backtrack if the
    /// winning path crosses them (re-queueing the displaced arcs).
    ///
    /// On success the route is bound in the device with weak strength and
    /// recorded in the arc book, and one of the with/without-rip-up
    /// counters is bumped. On failure the arc holds no wires.
    pub(crate) fn route_arc(&mut self, arc: Arc, ripup: bool) -> bool {
        let net = arc.net;
        let src_wire = self
            .dev
            .source_wire(net)
            .unwrap_or_else(|| panic!("route_arc: no source wire for {arc}"));
        let dst_wire = self
            .dev
            .sink_wire(net, arc.sink)
            .unwrap_or_else(|| panic!("route_arc: no sink wire for {arc}"));
        self.ripup_flag = false;

        if self.dev.debug() {
            self.log.line(&format!(
                "Routing arc {} on net {} ({} arcs total):",
                arc.sink,
                self.dev.net_name(net),
                self.dev.sink_count(net)
            ));
            self.log
                .line(&format!("  source ... {}", self.dev.wire_name(src_wire)));
            self.log
                .line(&format!("  sink ..... {}", self.dev.wire_name(dst_wire)));
        }

        // Release wires used exclusively by this arc. Wires shared with
        // sibling arcs of the same net stay bound.
        for wire in self.book.wires_of(arc) {
            if self.book.unbind(arc, wire) {
                if self.dev.debug() {
                    self.log
                        .line(&format!("  unbind {}", self.dev.wire_name(wire)));
                }
                self.dev.unbind_wire(wire);
            }
        }

        // Reset the search scratch state.
        self.frontier.clear();
        self.visited.clear();

        let mut visit_cnt: u64 = 0;
        let mut max_visit_cnt = u64::MAX;
        let mut best_est: i64 = 0;
        let mut best_score: i64 = -1;

        {
            let qw = QueuedWire {
                wire: src_wire,
                pip: None,
                delay: self.dev.wire_delay(src_wire).max_ps,
                penalty: 0,
                bonus: 0,
                togo: if self.cfg.use_estimate {
                    self.dev.estimate(src_wire, dst_wire)
                } else {
                    0
                },
                randtag: self.dev.rng(),
            };
            if self.cfg.use_estimate {
                best_est = qw.delay + qw.togo;
            }
            self.frontier.push(qw);
            self.visited.insert(qw.wire, qw);
        }

        while visit_cnt < max_visit_cnt {
            visit_cnt += 1;
            let qw = match self.frontier.pop() {
                Some(qw) => qw,
                None => break,
            };

            for pip in self.dev.downhill_pips(qw.wire) {
                let next_wire = self.dev.pip_dst(pip);
                let next_delay = qw.delay
                    + self.dev.pip_delay(pip).max_ps
                    + self.dev.wire_delay(next_wire).max_ps;
                let mut next_penalty = qw.penalty;
                let mut next_bonus = qw.bonus;

                let recorded = self.dev.net_wires(net).get(&next_wire).copied();
                let wire_reuse = recorded.is_some();
                let pip_reuse = recorded.is_some_and(|b| b.pip == Some(pip));

                let mut conflict_wire_wire: Option<WireId> = None;
                let mut conflict_wire_net: Option<NetId> = None;
                let mut conflict_pip_wire: Option<WireId> = None;
                let mut conflict_pip_net: Option<NetId> = None;

                if !self.dev.check_wire_avail(next_wire) && !wire_reuse {
                    if !ripup {
                        continue;
                    }
                    conflict_wire_wire = self.dev.conflicting_wire_wire(next_wire);
                    if conflict_wire_wire.is_none() {
                        conflict_wire_net = self.dev.conflicting_wire_net(next_wire);
                        if conflict_wire_net.is_none() {
                            continue;
                        }
                    }
                }

                if !self.dev.check_pip_avail(pip) && !pip_reuse {
                    if !ripup {
                        continue;
                    }
                    conflict_pip_wire = self.dev.conflicting_pip_wire(pip);
                    if conflict_pip_wire.is_none() {
                        conflict_pip_net = self.dev.conflicting_pip_net(pip);
                        if conflict_pip_net.is_none() {
                            continue;
                        }
                    }
                }

                deconflict(
                    &*self.dev,
                    &mut conflict_wire_wire,
                    &mut conflict_wire_net,
                    &mut conflict_pip_wire,
                    &mut conflict_pip_net,
                );

                if wire_reuse {
                    next_bonus += self.cost.wire_reuse_bonus;
                }
                if pip_reuse {
                    next_bonus += self.cost.pip_reuse_bonus;
                }

                if let Some(w) = conflict_wire_wire {
                    next_penalty += self.cost.wire_ripup_penalty * (1 + self.scores.wire(w) as i64);
                }
                if let Some(w) = conflict_pip_wire {
                    next_penalty += self.cost.wire_ripup_penalty * (1 + self.scores.wire(w) as i64);
                }
                if let Some(n) = conflict_wire_net {
                    next_penalty += self.cost.net_ripup_penalty * (1 + self.scores.net(n) as i64)
                        + self.cost.wire_ripup_penalty * self.dev.net_wires(n).len() as i64;
                }
                if let Some(n) = conflict_pip_net {
                    next_penalty += self.cost.net_ripup_penalty * (1 + self.scores.net(n) as i64)
                        + self.cost.wire_ripup_penalty * self.dev.net_wires(n).len() as i64;
                }

                let next_score = next_delay + next_penalty;
                debug_assert!(next_score >= 0);

                if best_score >= 0
                    && next_score - next_bonus - self.cost.estimate_precision > best_score
                {
                    continue;
                }

                if let Some(old) = self.visited.get(&next_wire) {
                    let old_score = old.delay + old.penalty;
                    if next_score + self.dev.delay_epsilon() >= old_score {
                        continue;
                    }
                }

                let togo = if self.cfg.use_estimate {
                    let togo = self.dev.estimate(next_wire, dst_wire);
                    let this_est = next_delay + togo;
                    // The frontier may overshoot the best estimate by a
                    // factor of two before the stall prune cuts it off.
                    if this_est / 2 - self.cost.estimate_precision > best_est {
                        continue;
                    }
                    if best_est > this_est {
                        best_est = this_est;
                    }
                    togo
                } else {
                    0
                };

                let next_qw = QueuedWire {
                    wire: next_wire,
                    pip: Some(pip),
                    delay: next_delay,
                    penalty: next_penalty,
                    bonus: next_bonus,
                    togo,
                    randtag: self.dev.rng(),
                };
                self.visited.insert(next_wire, next_qw);
                self.frontier.push(next_qw);

                if next_wire == dst_wire {
                    if max_visit_cnt == u64::MAX {
                        max_visit_cnt = 2 * visit_cnt;
                    }
                    best_score = next_score - next_bonus;
                }
            }
        }

        if self.dev.debug() {
            self.log
                .line(&format!("  total number of visited nodes: {visit_cnt}"));
        }

        let dst_entry = match self.visited.get(&dst_wire) {
            Some(entry) => *entry,
            None => {
                if self.dev.debug() {
                    self.log.line("  no route found for this arc");
                }
                return false;
            }
        };

        if self.dev.debug() {
            self.log
                .line(&format!("  final route delay:   {:8}", dst_entry.delay));
            self.log
                .line(&format!("  final route penalty: {:8}", dst_entry.penalty));
            self.log
                .line(&format!("  final route bonus:   {:8}", dst_entry.bonus));
        }

        // Backtrack from the sink, ripping up whatever still occupies the
        // winning path, and bind it to the net.
        let mut cursor = dst_wire;
        loop {
            let pip = self.visited[&cursor].pip;

            if self.dev.debug() {
                self.log
                    .line(&format!("  node {}", self.dev.wire_name(cursor)));
            }

            if pip.is_none() {
                assert_eq!(
                    cursor, src_wire,
                    "backtrack reached a pip-less wire away from the source"
                );
            }

            let recorded = self.dev.net_wires(net).get(&cursor).copied();
            let already_bound = recorded.is_some_and(|b| b.pip == pip);
            if !already_bound {
                if !self.dev.check_wire_avail(cursor) {
                    self.ripup_wire(cursor);
                    assert!(
                        self.dev.check_wire_avail(cursor),
                        "rip-up failed to free wire {}",
                        self.dev.wire_name(cursor)
                    );
                }
                match pip {
                    None => {
                        if self.dev.debug() {
                            self.log
                                .line(&format!("    bind wire {}", self.dev.wire_name(cursor)));
                        }
                        self.dev.bind_wire(cursor, net, BindStrength::Weak);
                    }
                    Some(pip) => {
                        if !self.dev.check_pip_avail(pip) {
                            self.ripup_pip(pip);
                            assert!(
                                self.dev.check_pip_avail(pip),
                                "rip-up failed to free pip {}",
                                self.dev.pip_name(pip)
                            );
                        }
                        if self.dev.debug() {
                            self.log
                                .line(&format!("    bind pip {}", self.dev.pip_name(pip)));
                        }
                        self.dev.bind_pip(pip, net, BindStrength::Weak);
                    }
                }
            }

            self.book.bind(arc, cursor);

            match pip {
                None => break,
                Some(pip) => cursor = self.dev.pip_src(pip),
            }
        }

        if self.ripup_flag {
            self.arcs_with_ripup += 1;
        } else {
            self.arcs_without_ripup += 1;
        }
        true
    }
}
