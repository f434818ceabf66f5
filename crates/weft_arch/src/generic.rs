//! A runtime-built device model.
//!
//! [`GenericDevice`] is the reference [`Device`] implementation: wires are
//! placed on an abstract (x, y) grid, pips connect them, and nets carry a
//! driver wire plus budgeted sinks. The delay estimate is Manhattan distance
//! scaled by a per-unit delay, and the random stream is a seeded PRNG so
//! routing runs are reproducible.
//!
//! Construction goes through [`DeviceBuilder`]; once built, only the binding
//! state is mutable.

use crate::ids::{NetId, PipId, WireId};
use crate::types::{BindStrength, Delay, WireBinding};
use crate::Device;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use weft_common::StateHash;

#[derive(Debug, Clone)]
struct WireData {
    name: String,
    x: i32,
    y: i32,
    delay: Delay,
}

#[derive(Debug, Clone)]
struct PipData {
    src: WireId,
    dst: WireId,
    delay: Delay,
}

#[derive(Debug, Clone)]
struct SinkData {
    wire: WireId,
    budget_ps: i64,
}

#[derive(Debug, Clone)]
struct NetData {
    name: String,
    has_driver: bool,
    source: Option<WireId>,
    sinks: Vec<SinkData>,
    global: bool,
    wires: HashMap<WireId, WireBinding>,
}

/// Builds a [`GenericDevice`] from wires, pips, and nets.
///
/// Wires carry a grid position used by the delay estimator. Pips are
/// directional. Nets reference previously added wires; a net may be built
/// without a driver (the router skips such nets).
#[derive(Debug)]
pub struct DeviceBuilder {
    wires: Vec<WireData>,
    pips: Vec<PipData>,
    nets: Vec<NetData>,
    seed: u64,
    estimate_unit_ps: i64,
    ripup_penalty_ps: i64,
    epsilon_ps: i64,
    debug: bool,
}

impl DeviceBuilder {
    /// Creates an empty builder with default timing parameters.
    pub fn new() -> Self {
        Self {
            wires: Vec::new(),
            pips: Vec::new(),
            nets: Vec::new(),
            seed: 1,
            estimate_unit_ps: 100,
            ripup_penalty_ps: 200,
            epsilon_ps: 1,
            debug: false,
        }
    }

    /// Adds a wire at grid position (x, y) with the given delay.
    pub fn wire(&mut self, name: &str, x: i32, y: i32, delay_ps: i64) -> WireId {
        let id = WireId::from_raw(self.wires.len() as u32);
        self.wires.push(WireData {
            name: name.to_string(),
            x,
            y,
            delay: Delay::uniform(delay_ps),
        });
        id
    }

    /// Adds a directional pip from `src` to `dst` with the given delay.
    pub fn pip(&mut self, src: WireId, dst: WireId, delay_ps: i64) -> PipId {
        let id = PipId::from_raw(self.pips.len() as u32);
        self.pips.push(PipData {
            src,
            dst,
            delay: Delay::uniform(delay_ps),
        });
        id
    }

    /// Adds a net with an optional driver wire and budgeted sink wires.
    ///
    /// Each sink is a `(wire, budget_ps)` pair; tighter budgets are routed
    /// earlier.
    pub fn net(&mut self, name: &str, source: Option<WireId>, sinks: &[(WireId, i64)]) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        self.nets.push(NetData {
            name: name.to_string(),
            has_driver: source.is_some(),
            source,
            sinks: sinks
                .iter()
                .map(|&(wire, budget_ps)| SinkData { wire, budget_ps })
                .collect(),
            global: false,
            wires: HashMap::new(),
        });
        id
    }

    /// Adds a net whose driver exists but has no wire yet (an unplaced
    /// driver). The router treats the missing source wire as a topology
    /// error rather than skipping the net.
    pub fn unplaced_net(&mut self, name: &str, sinks: &[(WireId, i64)]) -> NetId {
        let id = self.net(name, None, sinks);
        self.nets[id.as_raw() as usize].has_driver = true;
        id
    }

    /// Flags a net as architecture-global; the router leaves it untouched.
    pub fn mark_global(&mut self, net: NetId) {
        self.nets[net.as_raw() as usize].global = true;
    }

    /// Sets the seed of the deterministic random stream.
    pub fn seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Sets the per-grid-unit delay used by the Manhattan estimator.
    pub fn estimate_unit(&mut self, ps: i64) {
        self.estimate_unit_ps = ps;
    }

    /// Sets the base rip-up penalty scalar.
    pub fn ripup_penalty(&mut self, ps: i64) {
        self.ripup_penalty_ps = ps;
    }

    /// Sets the smallest significant delay difference.
    pub fn delay_epsilon(&mut self, ps: i64) {
        self.epsilon_ps = ps;
    }

    /// Enables per-step trace output from the router.
    pub fn debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Finalises the device, computing the downhill-pip adjacency.
    pub fn build(self) -> GenericDevice {
        let mut downhill = vec![Vec::new(); self.wires.len()];
        for (idx, pip) in self.pips.iter().enumerate() {
            downhill[pip.src.as_raw() as usize].push(PipId::from_raw(idx as u32));
        }
        GenericDevice {
            wires: self.wires,
            pips: self.pips,
            downhill,
            nets: self.nets,
            wire_to_net: HashMap::new(),
            pip_to_net: HashMap::new(),
            rng: StdRng::seed_from_u64(self.seed),
            estimate_unit_ps: self.estimate_unit_ps,
            ripup_penalty_ps: self.ripup_penalty_ps,
            epsilon_ps: self.epsilon_ps,
            debug: self.debug,
        }
    }
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A runtime-built routing fabric with mutable binding state.
///
/// Wire-level conflicts on this fabric always resolve to the owning net:
/// there are no aliased resources, so [`Device::conflicting_wire_wire`] and
/// [`Device::conflicting_pip_wire`] return `None`.
#[derive(Debug)]
pub struct GenericDevice {
    wires: Vec<WireData>,
    pips: Vec<PipData>,
    downhill: Vec<Vec<PipId>>,
    nets: Vec<NetData>,
    wire_to_net: HashMap<WireId, NetId>,
    pip_to_net: HashMap<PipId, NetId>,
    rng: StdRng,
    estimate_unit_ps: i64,
    ripup_penalty_ps: i64,
    epsilon_ps: i64,
    debug: bool,
}

impl GenericDevice {
    fn wire_data(&self, wire: WireId) -> &WireData {
        &self.wires[wire.as_raw() as usize]
    }

    fn pip_data(&self, pip: PipId) -> &PipData {
        &self.pips[pip.as_raw() as usize]
    }

    fn net_data(&self, net: NetId) -> &NetData {
        &self.nets[net.as_raw() as usize]
    }

    /// Returns the net currently bound to a wire, if any.
    pub fn bound_wire_net(&self, wire: WireId) -> Option<NetId> {
        self.wire_to_net.get(&wire).copied()
    }

    /// Returns the net currently bound to a pip, if any.
    pub fn bound_pip_net(&self, pip: PipId) -> Option<NetId> {
        self.pip_to_net.get(&pip).copied()
    }
}

impl Device for GenericDevice {
    fn nets(&self) -> Vec<NetId> {
        (0..self.nets.len() as u32).map(NetId::from_raw).collect()
    }

    fn net_name(&self, net: NetId) -> &str {
        &self.net_data(net).name
    }

    fn has_driver(&self, net: NetId) -> bool {
        self.net_data(net).has_driver
    }

    fn is_global(&self, net: NetId) -> bool {
        self.net_data(net).global
    }

    fn sink_count(&self, net: NetId) -> usize {
        self.net_data(net).sinks.len()
    }

    fn sink_budget(&self, net: NetId, sink: usize) -> i64 {
        self.net_data(net).sinks[sink].budget_ps
    }

    fn source_wire(&self, net: NetId) -> Option<WireId> {
        self.net_data(net).source
    }

    fn sink_wire(&self, net: NetId, sink: usize) -> Option<WireId> {
        Some(self.net_data(net).sinks[sink].wire)
    }

    fn net_wires(&self, net: NetId) -> &HashMap<WireId, WireBinding> {
        &self.net_data(net).wires
    }

    fn estimate(&self, src: WireId, dst: WireId) -> i64 {
        let a = self.wire_data(src);
        let b = self.wire_data(dst);
        let dist = (a.x - b.x).abs() as i64 + (a.y - b.y).abs() as i64;
        dist * self.estimate_unit_ps
    }

    fn wire_delay(&self, wire: WireId) -> Delay {
        self.wire_data(wire).delay
    }

    fn pip_delay(&self, pip: PipId) -> Delay {
        self.pip_data(pip).delay
    }

    fn delay_epsilon(&self) -> i64 {
        self.epsilon_ps
    }

    fn downhill_pips(&self, wire: WireId) -> Vec<PipId> {
        self.downhill[wire.as_raw() as usize].clone()
    }

    fn pip_src(&self, pip: PipId) -> WireId {
        self.pip_data(pip).src
    }

    fn pip_dst(&self, pip: PipId) -> WireId {
        self.pip_data(pip).dst
    }

    fn check_wire_avail(&self, wire: WireId) -> bool {
        !self.wire_to_net.contains_key(&wire)
    }

    fn check_pip_avail(&self, pip: PipId) -> bool {
        !self.pip_to_net.contains_key(&pip)
    }

    fn conflicting_wire_wire(&self, _wire: WireId) -> Option<WireId> {
        None
    }

    fn conflicting_wire_net(&self, wire: WireId) -> Option<NetId> {
        self.wire_to_net.get(&wire).copied()
    }

    fn conflicting_pip_wire(&self, _pip: PipId) -> Option<WireId> {
        None
    }

    fn conflicting_pip_net(&self, pip: PipId) -> Option<NetId> {
        self.pip_to_net.get(&pip).copied()
    }

    fn bind_wire(&mut self, wire: WireId, net: NetId, strength: BindStrength) {
        assert!(
            self.check_wire_avail(wire),
            "bind_wire: wire {} is already bound",
            self.wire_name(wire)
        );
        self.wire_to_net.insert(wire, net);
        self.nets[net.as_raw() as usize]
            .wires
            .insert(wire, WireBinding { pip: None, strength });
    }

    fn bind_pip(&mut self, pip: PipId, net: NetId, strength: BindStrength) {
        let dst = self.pip_data(pip).dst;
        assert!(
            self.check_pip_avail(pip),
            "bind_pip: pip {} is already bound",
            self.pip_name(pip)
        );
        assert!(
            self.check_wire_avail(dst),
            "bind_pip: destination wire {} is already bound",
            self.wire_name(dst)
        );
        self.pip_to_net.insert(pip, net);
        self.wire_to_net.insert(dst, net);
        self.nets[net.as_raw() as usize].wires.insert(
            dst,
            WireBinding {
                pip: Some(pip),
                strength,
            },
        );
    }

    fn unbind_wire(&mut self, wire: WireId) {
        let net = match self.wire_to_net.remove(&wire) {
            Some(net) => net,
            None => panic!("unbind_wire: wire {} is not bound", self.wire_name(wire)),
        };
        let binding = self.nets[net.as_raw() as usize]
            .wires
            .remove(&wire)
            .unwrap_or_else(|| {
                panic!(
                    "unbind_wire: wire {} missing from wires map of net {}",
                    self.wires[wire.as_raw() as usize].name,
                    self.nets[net.as_raw() as usize].name
                )
            });
        if let Some(pip) = binding.pip {
            self.pip_to_net.remove(&pip);
        }
    }

    fn rng(&mut self) -> i32 {
        (self.rng.gen::<u32>() & 0x3fff_ffff) as i32
    }

    fn ripup_delay_penalty(&self) -> i64 {
        self.ripup_penalty_ps
    }

    fn checksum(&self) -> StateHash {
        // Entries are sorted before hashing so the fingerprint does not
        // depend on hash-map iteration order.
        let mut bytes = Vec::new();
        for (net_idx, net) in self.nets.iter().enumerate() {
            let mut entries: Vec<(WireId, Option<PipId>, BindStrength)> = net
                .wires
                .iter()
                .map(|(&w, b)| (w, b.pip, b.strength))
                .collect();
            entries.sort_by_key(|&(w, _, _)| w);
            for (wire, pip, strength) in entries {
                bytes.extend_from_slice(&(net_idx as u32).to_le_bytes());
                bytes.extend_from_slice(&wire.as_raw().to_le_bytes());
                bytes.extend_from_slice(&pip.map_or(u32::MAX, PipId::as_raw).to_le_bytes());
                bytes.push(strength as u8);
            }
        }
        StateHash::from_bytes(&bytes)
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn wire_name(&self, wire: WireId) -> String {
        self.wire_data(wire).name.clone()
    }

    fn pip_name(&self, pip: PipId) -> String {
        let data = self.pip_data(pip);
        format!(
            "{}->{}",
            self.wire_data(data.src).name,
            self.wire_data(data.dst).name
        )
    }
}
