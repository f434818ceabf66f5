//! Device models for the Weft detailed router.
//!
//! This crate provides the [`Device`] trait — the narrow interface through
//! which the router sees a placed design and its routing fabric — and
//! [`GenericDevice`](generic::GenericDevice), a runtime-built implementation
//! used as the reference fabric for tests and small architectures.
//!
//! The routing graph is implicit: the router never sees a materialised graph,
//! only per-wire successor queries ([`Device::downhill_pips`]). Binding state
//! (which net owns which wire/pip, and through which pip each wire is
//! reached) lives in the device, mutated only through
//! [`bind_wire`](Device::bind_wire) / [`bind_pip`](Device::bind_pip) /
//! [`unbind_wire`](Device::unbind_wire).
//!
//! # Locking
//!
//! The router takes `&mut dyn Device` for the whole routing call, so the
//! exclusive borrow *is* the lock: the router is the only mutator for the
//! duration of the call and there is nothing to release on error paths.

#![warn(missing_docs)]

pub mod generic;
pub mod ids;
pub mod types;

pub use generic::{DeviceBuilder, GenericDevice};
pub use ids::{NetId, PipId, WireId};
pub use types::{BindStrength, Delay, WireBinding};

use std::collections::HashMap;
use weft_common::StateHash;

/// The device context consumed by the router.
///
/// Implementations model a placed design on a routing fabric: nets with a
/// driver and sinks, wires connected by directional pips, per-resource
/// delays, and the mutable binding state. All handles are value types
/// ([`NetId`], [`WireId`], [`PipId`]); the router stores them freely.
pub trait Device {
    // --- Netlist queries ---

    /// Returns all nets in the design, in a stable order.
    fn nets(&self) -> Vec<NetId>;

    /// Returns the human-readable name of a net, for diagnostics.
    fn net_name(&self, net: NetId) -> &str;

    /// Returns whether the net has a driver. Driverless nets are skipped
    /// by the router.
    fn has_driver(&self, net: NetId) -> bool;

    /// Returns whether the net is an architecture-global net (clock spines
    /// and similar) that the router must leave untouched.
    fn is_global(&self, net: NetId) -> bool;

    /// Returns the number of sinks on the net.
    fn sink_count(&self, net: NetId) -> usize;

    /// Returns the timing budget of the given sink, in picoseconds.
    ///
    /// The budget is a slack proxy: arcs with tighter budgets are routed
    /// earlier.
    fn sink_budget(&self, net: NetId, sink: usize) -> i64;

    /// Resolves the net's driver to a wire, or `None` if the placement
    /// provides no wire for it.
    fn source_wire(&self, net: NetId) -> Option<WireId>;

    /// Resolves the given sink to a wire, or `None` if the placement
    /// provides no wire for it.
    fn sink_wire(&self, net: NetId, sink: usize) -> Option<WireId>;

    /// Returns the net's wires map: every wire currently bound to the net,
    /// with the pip through which it is reached and the binding strength.
    fn net_wires(&self, net: NetId) -> &HashMap<WireId, WireBinding>;

    // --- Graph and timing queries ---

    /// Estimates the routing delay from `src` to `dst`, in picoseconds.
    ///
    /// Used both as the A* heuristic and to order arcs by slack. Should be
    /// admissible; the router degrades gracefully (but slower) if it is not.
    fn estimate(&self, src: WireId, dst: WireId) -> i64;

    /// Returns the propagation delay of a wire segment.
    fn wire_delay(&self, wire: WireId) -> Delay;

    /// Returns the propagation delay through a pip.
    fn pip_delay(&self, pip: PipId) -> Delay;

    /// Returns the smallest delay difference the device considers
    /// significant. The search requires strictly-better-by-epsilon
    /// improvements before revisiting a wire.
    fn delay_epsilon(&self) -> i64;

    /// Returns the pips whose source is the given wire.
    ///
    /// This is the implicit-graph expansion; results are not cached across
    /// searches.
    fn downhill_pips(&self, wire: WireId) -> Vec<PipId>;

    /// Returns the source wire of a pip.
    fn pip_src(&self, pip: PipId) -> WireId;

    /// Returns the destination wire of a pip.
    fn pip_dst(&self, pip: PipId) -> WireId;

    // --- Availability and conflicts ---

    /// Returns whether the wire can currently be bound.
    fn check_wire_avail(&self, wire: WireId) -> bool;

    /// Returns whether the pip can currently be bound.
    fn check_pip_avail(&self, pip: PipId) -> bool;

    /// Returns the *other* wire whose binding blocks this wire, if the
    /// fabric aliases resources. A wire may be blocked by a wire distinct
    /// from itself.
    fn conflicting_wire_wire(&self, wire: WireId) -> Option<WireId>;

    /// Returns the net whose binding blocks this wire, if any.
    fn conflicting_wire_net(&self, wire: WireId) -> Option<NetId>;

    /// Returns the wire whose binding blocks this pip, if any.
    fn conflicting_pip_wire(&self, pip: PipId) -> Option<WireId>;

    /// Returns the net whose binding blocks this pip, if any.
    fn conflicting_pip_net(&self, pip: PipId) -> Option<NetId>;

    // --- Binding mutation ---

    /// Binds a wire to a net with no driving pip (the net's source).
    ///
    /// The wire must be available; violating this is a caller bug.
    fn bind_wire(&mut self, wire: WireId, net: NetId, strength: BindStrength);

    /// Binds a pip and its destination wire to a net.
    ///
    /// Both the pip and its destination wire must be available.
    fn bind_pip(&mut self, pip: PipId, net: NetId, strength: BindStrength);

    /// Releases a wire from its net. If the wire was reached through a pip,
    /// that pip is released too.
    fn unbind_wire(&mut self, wire: WireId);

    // --- Misc ---

    /// Returns the next value of the device's deterministic random stream,
    /// used to break cost ties in the search.
    fn rng(&mut self) -> i32;

    /// Returns the base penalty scalar, in picoseconds, from which all
    /// rip-up penalties and reuse bonuses are derived.
    fn ripup_delay_penalty(&self) -> i64;

    /// Returns a fingerprint of the current binding state.
    fn checksum(&self) -> StateHash;

    /// Returns whether per-step trace output should be emitted.
    fn debug(&self) -> bool {
        false
    }

    /// Returns a human-readable name for a wire, for diagnostics and traces.
    fn wire_name(&self, wire: WireId) -> String;

    /// Returns a human-readable name for a pip, for diagnostics and traces.
    fn pip_name(&self, pip: PipId) -> String;
}
