//! Router configuration and the derived cost model.
//!
//! [`RouterConfig`] holds the user-tunable options, loadable from a TOML
//! table. [`CostModel`] holds the penalty and bonus magnitudes, all derived
//! from the device's single `ripup_delay_penalty()` scalar.

use serde::{Deserialize, Serialize};
use weft_arch::Device;

/// Errors that can occur when loading a router configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML content could not be parsed.
    #[error("failed to parse router configuration: {0}")]
    ParseError(String),
}

/// User-tunable router options.
///
/// Field names in TOML use camelCase (`useEstimate`, `cleanupReroute`, ...);
/// unknown keys are ignored so configurations can carry options for other
/// passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// Cap on outer-loop iterations (arcs popped from the routing queue).
    /// `0` disables the cap; on exhaustion the router reports
    /// non-convergence and fails.
    pub max_iter_cnt: u64,
    /// Allow opportunistic reroutes of already-routed arcs. Accepted for
    /// configuration compatibility; no core code path consults it.
    pub cleanup_reroute: bool,
    /// Deeper cleanup pass. Accepted for configuration compatibility; no
    /// core code path consults it.
    pub full_cleanup_reroute: bool,
    /// Enables the A* heuristic term and its pruning. Disabling degrades
    /// the search to uniform-cost expansion.
    pub use_estimate: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_iter_cnt: 0,
            cleanup_reroute: true,
            full_cleanup_reroute: true,
            use_estimate: true,
        }
    }
}

impl RouterConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Penalty and bonus magnitudes used by the arc search, in picoseconds.
///
/// All five values derive from the device's `ripup_delay_penalty()`:
/// net-level rip-up costs ten times a wire-level one, reuse bonuses are
/// fractions of it, and the pruning slack is a hundred times it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// Penalty per conflicting wire, scaled by the wire's rip-up score.
    pub wire_ripup_penalty: i64,
    /// Penalty per conflicting net, scaled by the net's rip-up score.
    pub net_ripup_penalty: i64,
    /// Bonus for landing on a wire the net already owns.
    pub wire_reuse_bonus: i64,
    /// Bonus for traversing the exact pip the net already uses.
    pub pip_reuse_bonus: i64,
    /// Slack applied to best-score and estimator pruning.
    pub estimate_precision: i64,
}

impl CostModel {
    /// Derives the cost model from the device's base penalty scalar.
    pub fn from_device(dev: &dyn Device) -> Self {
        let wire_ripup_penalty = dev.ripup_delay_penalty();
        Self {
            wire_ripup_penalty,
            net_ripup_penalty: 10 * wire_ripup_penalty,
            wire_reuse_bonus: wire_ripup_penalty / 8,
            pip_reuse_bonus: wire_ripup_penalty / 2,
            estimate_precision: 100 * wire_ripup_penalty,
        }
    }
}
