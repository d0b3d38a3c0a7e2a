//! Login handshake and disconnect handling for netcomm.
//!
//! The transport is fully asynchronous, but logging in is not: the caller
//! sends a login command and then wants a yes or no. This crate bridges
//! the two:
//!
//! 1. **Rendezvous**: [`LoginMonitor`] is resolved exactly once by the
//!    executor (login success or a disconnect reply) while the caller
//!    waits with a timeout.
//! 2. **Disconnects**: [`DisconnectReason`] decodes the server's reason
//!    byte, and a disconnect outside a pending login tears the connection
//!    down through the [`Teardown`] handle and tells the UI.
//!
//! # How it fits in the stack
//!
//! ```text
//! Caller (above)      ← start_login / wait_until_login_done
//!     ↕
//! Session (this crate) ← login state, disconnect reasons
//!     ↕
//! Executor (below)    ← replies call report_login_success / report_disconnect
//! ```

mod error;
mod login;
mod reason;

pub use error::SessionError;
pub use login::{DisconnectHandler, LoginMonitor, LoginState, Teardown};
pub use reason::DisconnectReason;
