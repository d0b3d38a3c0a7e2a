//! # netcomm
//!
//! Checksummed binary transport for game clients.
//!
//! netcomm keeps one TCP connection to a game server. Outgoing commands
//! and incoming replies are framed with a type ID, an inverse-check byte,
//! a length, and a checksum, so a corrupted or misaligned stream recovers
//! on its own. Replies are decoded through a [`ReplyRegistry`] and run,
//! strictly in order, against a context object of your choosing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use netcomm::prelude::*;
//!
//! #[derive(Debug)]
//! struct KeepAliveCmd;
//!
//! impl ClientCommand for KeepAliveCmd {
//!     fn id(&self) -> u8 {
//!         0x01
//!     }
//!
//!     fn encode(&self, _: &mut Writer<'_>) {}
//! }
//!
//! # async fn run() -> Result<(), NetCommError> {
//! let registry = Arc::new(ReplyRegistry::<()>::new());
//! let net = NetComm::new(NetConfig::default());
//! net.connect("127.0.0.1", 3012, registry, Arc::new(())).await?;
//! net.setup_keep_alive(Duration::from_secs(10), Arc::new(KeepAliveCmd));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate layout
//!
//! ```text
//! netcomm            ← connection lifecycle, config, keep-alive (this crate)
//!   netcomm-session  ← login rendezvous, disconnect reasons
//!   netcomm-transport← receiver, sender, executor tasks
//!   netcomm-protocol ← command/reply traits, reply registry
//!   netcomm-wire     ← framing, checksum, field codec
//! ```

mod config;
mod connection;
mod error;
mod keepalive;

pub use config::NetConfig;
pub use connection::NetComm;
pub use error::NetCommError;

pub use netcomm_protocol::{ClientCommand, ReplyRegistry, ServerReply};
pub use netcomm_session::{
    DisconnectHandler, DisconnectReason, LoginMonitor, LoginState, Teardown,
};
pub use netcomm_transport::{ConnectionStatus, CrashHandler, SharedCommand};
pub use netcomm_wire::{CharacterId, Location, Reader, WireError, Writer};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Does nothing
/// if a global subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Common imports for code that talks to a server.
pub mod prelude {
    pub use crate::{
        CharacterId, ClientCommand, ConnectionStatus, DisconnectReason,
        LoginMonitor, Location, NetComm, NetCommError, NetConfig, Reader,
        ReplyRegistry, ServerReply, WireError, Writer,
    };
}
