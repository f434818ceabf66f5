//! Opaque ID newtypes for routing-fabric entities.
//!
//! [`WireId`], [`PipId`], and [`NetId`] are thin `u32` wrappers used as
//! stable handles into a device model. They are `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`. Long-lived router state stores these handles,
//! never references into the device's internal tables.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a routing wire segment in the device.
    WireId
);

define_id!(
    /// Opaque, copyable ID for a programmable interconnect point (pip),
    /// a directional switch connecting a source wire to a destination wire.
    PipId
);

define_id!(
    /// Opaque, copyable ID for a net (one driver, one or more sinks).
    NetId
);
