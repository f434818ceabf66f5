//! Post-route structural validation of the device binding state.
//!
//! For every routable net, the binding must form a tree rooted at the
//! source wire whose leaves are exactly the declared sinks: no loops, no
//! stubs (leaves that are not sinks), no dangling wires unreachable from
//! the source, and no unbound source or sink. The validator only reads the
//! device's wires maps; it never mutates anything, so re-running it on an
//! unchanged binding gives the same answer.

use crate::log::RouteLog;
use std::collections::{HashMap, HashSet};
use weft_arch::{Device, NetId, WireId};

/// Validates the routing of every non-skipped net.
///
/// Returns `false` on the first net with an unrouted source/sink, a loop,
/// a stub, or a dangling wire. With the device's debug flag set, a per-wire
/// trace of each net's routing tree is written to `log`.
pub fn check_routed_design(dev: &dyn Device, log: &mut RouteLog) -> bool {
    for net in dev.nets() {
        if dev.is_global(net) || !dev.has_driver(net) {
            continue;
        }
        if !check_net(dev, net, log) {
            return false;
        }
    }
    true
}

/// The labelling walk over one net's routing tree.
struct NetWalk<'a> {
    dev: &'a dyn Device,
    log: &'a mut RouteLog,
    debug: bool,
    children: HashMap<WireId, Vec<WireId>>,
    dest_wires: HashMap<WireId, usize>,
    order_num: HashMap<WireId, u32>,
    logged_wires: HashSet<WireId>,
    found_loop: bool,
    found_stub: bool,
}

impl NetWalk<'_> {
    /// Labels every wire reachable from `root` with its depth, flagging
    /// re-visited wires as loops and non-sink leaves as stubs.
    ///
    /// Iterative on an explicit stack: a crafted binding must not be able
    /// to overflow the call stack.
    fn label_from(&mut self, root: WireId) {
        let mut stack: Vec<(WireId, u32)> = vec![(root, 1)];
        while let Some((wire, num)) = stack.pop() {
            let width = 2 * num as usize;
            if self.order_num.contains_key(&wire) {
                self.found_loop = true;
                if self.debug {
                    self.log.line(&format!("  {:width$}=> loop", ""));
                }
                continue;
            }
            self.order_num.insert(wire, num);

            match self.children.get(&wire) {
                Some(kids) => {
                    let kids = kids.clone();
                    for &child in &kids {
                        if self.debug {
                            self.log
                                .line(&format!("  {:width$}-> {}", "", self.dev.wire_name(child)));
                            self.logged_wires.insert(child);
                        }
                        stack.push((child, num + 1));
                    }
                }
                None => {
                    if let Some(&sink_idx) = self.dest_wires.get(&wire) {
                        if self.debug {
                            self.log.line(&format!("  {:width$}=> sink {}", "", sink_idx));
                        }
                    } else {
                        self.found_stub = true;
                        if self.debug {
                            self.log.line(&format!("  {:width$}=> stub", ""));
                        }
                    }
                }
            }
        }
    }
}

fn check_net(dev: &dyn Device, net: NetId, log: &mut RouteLog) -> bool {
    let debug = dev.debug();
    if debug {
        log.line(&format!("checking net {}", dev.net_name(net)));
    }

    // A net with no sinks must carry no routing at all.
    if dev.sink_count(net) == 0 {
        if debug {
            log.line("  net without sinks");
        }
        assert!(
            dev.net_wires(net).is_empty(),
            "sinkless net {} has bound wires",
            dev.net_name(net)
        );
        return true;
    }

    let mut found_unrouted = false;

    let mut children: HashMap<WireId, Vec<WireId>> = HashMap::new();
    for (&wire, binding) in dev.net_wires(net) {
        if let Some(pip) = binding.pip {
            assert_eq!(
                dev.pip_dst(pip),
                wire,
                "binding of wire {} names a pip that does not drive it",
                dev.wire_name(wire)
            );
            children.entry(dev.pip_src(pip)).or_default().push(wire);
        }
    }

    let src_wire = match dev.source_wire(net) {
        Some(w) => w,
        None => panic!("net {} has no source wire", dev.net_name(net)),
    };
    if !dev.net_wires(net).contains_key(&src_wire) {
        if debug {
            log.line(&format!(
                "  source ({}) not bound to net",
                dev.wire_name(src_wire)
            ));
        }
        found_unrouted = true;
    }

    let mut dest_wires: HashMap<WireId, usize> = HashMap::new();
    for sink_idx in 0..dev.sink_count(net) {
        let dst_wire = match dev.sink_wire(net, sink_idx) {
            Some(w) => w,
            None => panic!("sink {} of net {} has no wire", sink_idx, dev.net_name(net)),
        };
        dest_wires.insert(dst_wire, sink_idx);
        if !dev.net_wires(net).contains_key(&dst_wire) {
            if debug {
                log.line(&format!(
                    "  sink {} ({}) not bound to net",
                    sink_idx,
                    dev.wire_name(dst_wire)
                ));
            }
            found_unrouted = true;
        }
    }

    let mut walk = NetWalk {
        dev,
        log,
        debug,
        children,
        dest_wires,
        order_num: HashMap::new(),
        logged_wires: HashSet::new(),
        found_loop: false,
        found_stub: false,
    };

    if debug {
        walk.log
            .line(&format!("  driver: {}", walk.dev.wire_name(src_wire)));
        walk.logged_wires.insert(src_wire);
    }
    walk.label_from(src_wire);

    // Anything still unlabelled in the child map is unreachable from the
    // source.
    let dangling_wires: HashSet<WireId> = walk
        .children
        .keys()
        .filter(|w| !walk.order_num.contains_key(w))
        .copied()
        .collect();

    if debug {
        if dangling_wires.is_empty() {
            walk.log.line("  no dangling wires.");
        } else {
            // Dangling roots: dangling wires no other dangling wire reaches.
            // Whatever the root walks still cannot label is a detached cycle.
            let mut root_wires = dangling_wires.clone();
            for &w in &dangling_wires {
                if let Some(kids) = walk.children.get(&w) {
                    for c in kids.clone() {
                        root_wires.remove(&c);
                    }
                }
            }
            for &w in &root_wires {
                walk.log
                    .line(&format!("  dangling wire: {}", walk.dev.wire_name(w)));
                walk.logged_wires.insert(w);
                walk.label_from(w);
            }
            for &w in &dangling_wires {
                if !walk.logged_wires.contains(&w) {
                    if let Some(binding) = walk.dev.net_wires(net).get(&w) {
                        if let Some(pip) = binding.pip {
                            walk.log.line(&format!(
                                "  loop: {} -> {}",
                                walk.dev.wire_name(walk.dev.pip_src(pip)),
                                walk.dev.wire_name(w)
                            ));
                        }
                    }
                }
            }
        }
    }

    let mut fail = false;
    if found_unrouted {
        if debug {
            walk.log.line("check failed: found unrouted arcs");
        }
        fail = true;
    }
    if walk.found_loop {
        if debug {
            walk.log.line("check failed: found loops");
        }
        fail = true;
    }
    if walk.found_stub {
        if debug {
            walk.log.line("check failed: found stubs");
        }
        fail = true;
    }
    if !dangling_wires.is_empty() {
        if debug {
            walk.log.line("check failed: found dangling wires");
        }
        fail = true;
    }

    !fail
}
