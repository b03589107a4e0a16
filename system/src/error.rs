use crate::Username;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raster bytes that do not decode into a pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cannot decode raster: {0}")]
pub struct DecodeError(pub String);

/// A call that would break a session invariant. The session is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("the manager cannot be kicked out")]
    KickManager,

    #[error("{0} has no pending join request")]
    NotPending(Username),

    #[error("a manager is already assigned")]
    ManagerAlreadySet,

    #[error("the session has been closed")]
    SessionClosed,

    #[error("the session has no manager")]
    NoManager,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum WhiteboardError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),

    /// The session task is gone; only happens while the process shuts down.
    #[error("session is unavailable")]
    SessionUnavailable,
}
