//! Error types for the session layer.

use std::time::Duration;

use crate::DisconnectReason;

/// Why a login did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Neither a success nor a disconnect reply arrived in time.
    #[error("no login answer within {0:?}")]
    TimedOut(Duration),

    /// The server refused the login and said why.
    #[error("login rejected: {0}")]
    Rejected(DisconnectReason),

    /// `wait` was called without a login in progress.
    #[error("no login in progress")]
    NotPending,
}
