//! Initial ingest: claim existing routing, seed the arc queue.
//!
//! Setup walks every routable net, verifies the netlist topology (no shared
//! source wires, no wire doubling as source and sink across nets, no
//! duplicate sinks), claims any routing already present in the device's
//! binding state, and queues every arc that is not yet fully routed from
//! driver to sink. Soft-bound wires left over with no arc referencing them
//! are released as dead routing.

use super::Router;
use crate::arc::Arc;
use std::collections::HashMap;
use weft_arch::{BindStrength, Device, NetId, WireId};
use weft_diagnostics::{Category, Diagnostic, DiagnosticCode};

impl Router<'_> {
    pub(crate) fn setup(&mut self) {
        let mut src_to_net: HashMap<WireId, NetId> = HashMap::new();
        let mut dst_to_arc: HashMap<WireId, Arc> = HashMap::new();

        for net in self.dev.nets() {
            if self.skip_net(net) {
                continue;
            }

            let src_wire = match self.dev.source_wire(net) {
                Some(w) => w,
                None => {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::new(Category::Error, 101),
                        format!(
                            "no wire found for the source of net {}",
                            self.dev.net_name(net)
                        ),
                    ));
                    return;
                }
            };

            if let Some(&other) = src_to_net.get(&src_wire) {
                self.sink.emit(Diagnostic::error(
                    DiagnosticCode::new(Category::Error, 102),
                    format!(
                        "found two nets with the same source wire {}: {} vs {}",
                        self.dev.wire_name(src_wire),
                        self.dev.net_name(net),
                        self.dev.net_name(other)
                    ),
                ));
                return;
            }

            if let Some(&arc) = dst_to_arc.get(&src_wire) {
                self.sink.emit(Diagnostic::error(
                    DiagnosticCode::new(Category::Error, 103),
                    format!(
                        "wire {} is used as source and sink in different nets: {} vs {} (sink {})",
                        self.dev.wire_name(src_wire),
                        self.dev.net_name(net),
                        self.dev.net_name(arc.net),
                        arc.sink
                    ),
                ));
                return;
            }

            for sink_idx in 0..self.dev.sink_count(net) {
                let dst_wire = match self.dev.sink_wire(net, sink_idx) {
                    Some(w) => w,
                    None => {
                        self.sink.emit(Diagnostic::error(
                            DiagnosticCode::new(Category::Error, 104),
                            format!(
                                "no wire found for sink {} of net {}",
                                sink_idx,
                                self.dev.net_name(net)
                            ),
                        ));
                        return;
                    }
                };

                if let Some(&prev) = dst_to_arc.get(&dst_wire) {
                    // Two sinks of the same net landing on one wire are
                    // duplicates; the first arc covers both.
                    if prev.net == net {
                        continue;
                    }
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::new(Category::Error, 105),
                        format!(
                            "found two arcs with the same sink wire {}: {} (sink {}) vs {} (sink {})",
                            self.dev.wire_name(dst_wire),
                            self.dev.net_name(net),
                            sink_idx,
                            self.dev.net_name(prev.net),
                            prev.sink
                        ),
                    ));
                    return;
                }

                if let Some(&other) = src_to_net.get(&dst_wire) {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::new(Category::Error, 103),
                        format!(
                            "wire {} is used as source and sink in different nets: {} vs {} (sink {})",
                            self.dev.wire_name(dst_wire),
                            self.dev.net_name(other),
                            self.dev.net_name(net),
                            sink_idx
                        ),
                    ));
                    return;
                }

                let arc = Arc::new(net, sink_idx);
                dst_to_arc.insert(dst_wire, arc);

                if !self.dev.net_wires(net).contains_key(&src_wire) {
                    self.queue
                        .insert_with_wires(arc, src_wire, dst_wire, &*self.dev);
                    continue;
                }

                // Walk the recorded route back from the sink, claiming each
                // wire for this arc.
                let mut cursor = dst_wire;
                self.book.bind(arc, cursor);
                while cursor != src_wire {
                    let binding = match self.dev.net_wires(net).get(&cursor) {
                        Some(b) => *b,
                        None => {
                            // The walk fell off the recorded route before
                            // reaching the source: discard the partial claim
                            // and route the arc from scratch.
                            for wire in self.book.wires_of(arc) {
                                self.book.unbind(arc, wire);
                            }
                            self.queue
                                .insert_with_wires(arc, src_wire, dst_wire, &*self.dev);
                            break;
                        }
                    };
                    let pip = binding.pip.unwrap_or_else(|| {
                        panic!(
                            "wire {} is bound to net {} without a driving pip",
                            self.dev.wire_name(cursor),
                            self.dev.net_name(net)
                        )
                    });
                    cursor = self.dev.pip_src(pip);
                    self.book.bind(arc, cursor);
                }
            }

            src_to_net.insert(src_wire, net);

            // Release soft routing that no arc of this net references.
            let unbind_wires: Vec<WireId> = self
                .dev
                .net_wires(net)
                .iter()
                .filter(|(w, b)| {
                    b.strength < BindStrength::Locked && self.book.arcs_of(**w).is_empty()
                })
                .map(|(&w, _)| w)
                .collect();
            for wire in unbind_wires {
                self.dev.unbind_wire(wire);
            }
        }
    }
}
