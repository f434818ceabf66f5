//! Common result and error types for the Weft router.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in Weft), not a
/// user-facing problem. User-facing problems (bad netlist topology,
/// unrouteable arcs) are reported through
/// [`DiagnosticSink`](../weft_diagnostics) and the operation returns a
/// normal value describing the outcome.
pub type WeftResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Weft, not a user input problem.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means there is a logic error in the router that should be fixed.
#[derive(Debug, thiserror::Error)]
#[error("internal router error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
