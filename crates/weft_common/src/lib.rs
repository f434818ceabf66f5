//! Shared result types and hashing for the Weft router workspace.
//!
//! Small leaf crate: the [`WeftResult`]/[`InternalError`] pair used for
//! unrecoverable internal failures, and the [`StateHash`] used to fingerprint
//! routing state for the end-of-run checksum line.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::StateHash;
pub use result::{InternalError, WeftResult};
