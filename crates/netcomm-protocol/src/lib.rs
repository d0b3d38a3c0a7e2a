//! Message contracts for netcomm.
//!
//! This crate defines what a message *is*, independent of any socket:
//!
//! - [`ClientCommand`]: an outbound, immutable value that knows its type
//!   ID and how to write its fields.
//! - [`ServerReply`]: an inbound, mutable record that reads its fields
//!   and then runs its effect through a context `C`.
//! - [`ReplyRegistry`]: the table from type ID to reply factory that the
//!   receiver uses to turn a frame into a reply.
//!
//! # Architecture
//!
//! ```text
//! Wire (bytes, frames) → Protocol (typed messages) → Transport (tasks)
//! ```

mod error;
mod message;
mod registry;

pub use error::ProtocolError;
pub use message::{encode_command, ClientCommand, ServerReply};
pub use registry::{ReplyFactory, ReplyRegistry};
