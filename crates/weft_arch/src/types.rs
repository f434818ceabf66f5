//! Shared data types for device models: delays, binding strengths, and
//! per-wire binding records.

use crate::ids::PipId;
use serde::{Deserialize, Serialize};

/// A timing delay with min/typical/max corners, in integer picoseconds.
///
/// Integer picoseconds rather than fractional nanoseconds: the router's
/// search heap needs a total order on cost sums, and the cost function does
/// exact comparisons against accumulated penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delay {
    /// Minimum delay in picoseconds (fast corner).
    pub min_ps: i64,
    /// Typical delay in picoseconds (nominal corner).
    pub typ_ps: i64,
    /// Maximum delay in picoseconds (slow corner).
    pub max_ps: i64,
}

impl Delay {
    /// A zero delay (no propagation time).
    pub const ZERO: Self = Self {
        min_ps: 0,
        typ_ps: 0,
        max_ps: 0,
    };

    /// Creates a new delay with the given min/typ/max values.
    pub fn new(min_ps: i64, typ_ps: i64, max_ps: i64) -> Self {
        Self {
            min_ps,
            typ_ps,
            max_ps,
        }
    }

    /// Creates a delay with all three corners equal.
    pub fn uniform(ps: i64) -> Self {
        Self {
            min_ps: ps,
            typ_ps: ps,
            max_ps: ps,
        }
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::ZERO
    }
}

/// How firmly a wire or pip is bound to a net.
///
/// Ordered from weakest to strongest. The router binds its own routing with
/// [`Weak`](BindStrength::Weak) strength and never touches
/// [`Locked`](BindStrength::Locked) bindings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum BindStrength {
    /// Soft routing created by the router itself; freely ripped up.
    #[default]
    Weak,
    /// Routing the router should prefer to keep but may still rip up.
    Strong,
    /// Placement-derived binding (e.g. a site pin); ripped up only at
    /// net granularity.
    Fixed,
    /// Immutable binding the router must never release.
    Locked,
}

/// One entry of a net's wires map: how a bound wire is reached.
///
/// `pip` is the switch driving this wire within the net's routing tree, or
/// `None` for the net's source wire (which no pip drives).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireBinding {
    /// The pip whose destination is this wire, or `None` at the source.
    pub pip: Option<PipId>,
    /// How firmly this wire is bound.
    pub strength: BindStrength,
}
