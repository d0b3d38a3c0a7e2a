//! Game-master monitor messages for netcomm.
//!
//! The monitor is a read-mostly client: it logs in with a privileged
//! account, watches players come, go, move, and talk, and occasionally
//! acts on them (warp, ban, broadcast).
//!
//! - [`commands`] holds everything the monitor can send.
//! - [`replies`] holds everything the server sends back; each publishes a
//!   [`MonitorEvent`] through the [`MonitorContext`].
//! - [`monitor_registry`] wires the replies to their type IDs.

pub mod commands;
mod context;
mod event;
pub mod replies;

pub use context::MonitorContext;
pub use event::{MonitorEvent, TalkType};

use netcomm_protocol::{ProtocolError, ReplyRegistry};

use crate::replies::{
    DisconnectMsg, LoginSuccessfulMsg, PlayerActionMsg, PlayerAttributeMsg,
    PlayerLocationMsg, PlayerLoginMsg, PlayerLogoutMsg, PlayerSkillMsg,
    PlayerTalkMsg,
};

/// Frame type IDs of the monitor protocol.
pub mod ids {
    // Client → server.
    pub const KEEP_ALIVE: u8 = 0x01;
    pub const BROADCAST: u8 = 0x02;
    pub const BAN_CHAR: u8 = 0x04;
    pub const CHANGE_ATTRIBUTE: u8 = 0x06;
    pub const REQUEST_ATTRIBUTES: u8 = 0x06;
    pub const CHANGE_SKILL: u8 = 0x07;
    pub const SERVER_COMMAND: u8 = 0x08;
    pub const WARP: u8 = 0x09;
    pub const SPEAK_AS: u8 = 0x0A;
    pub const LOGIN: u8 = 0x0D;

    // Server → client.
    pub const LOGIN_SUCCESSFUL: u8 = 0x00;
    pub const PLAYER_LOGIN: u8 = 0x02;
    pub const PLAYER_TALK: u8 = 0x03;
    pub const PLAYER_LOGOUT: u8 = 0x04;
    pub const PLAYER_LOCATION: u8 = 0x05;
    pub const PLAYER_ATTRIBUTE: u8 = 0x06;
    pub const PLAYER_SKILL: u8 = 0x07;
    pub const PLAYER_ACTION: u8 = 0x08;
    pub const DISCONNECT: u8 = 0xCC;
}

/// Builds the reply registry for the monitor protocol.
///
/// # Errors
/// Only if two replies share an ID, which is a bug in this table.
pub fn monitor_registry() -> Result<ReplyRegistry<MonitorContext>, ProtocolError> {
    let mut registry = ReplyRegistry::new();
    registry.register_default::<LoginSuccessfulMsg>(ids::LOGIN_SUCCESSFUL)?;
    registry.register_default::<PlayerLoginMsg>(ids::PLAYER_LOGIN)?;
    registry.register_default::<PlayerTalkMsg>(ids::PLAYER_TALK)?;
    registry.register_default::<PlayerLogoutMsg>(ids::PLAYER_LOGOUT)?;
    registry.register_default::<PlayerLocationMsg>(ids::PLAYER_LOCATION)?;
    registry.register_default::<PlayerAttributeMsg>(ids::PLAYER_ATTRIBUTE)?;
    registry.register_default::<PlayerSkillMsg>(ids::PLAYER_SKILL)?;
    registry.register_default::<PlayerActionMsg>(ids::PLAYER_ACTION)?;
    registry.register_default::<DisconnectMsg>(ids::DISCONNECT)?;
    Ok(registry)
}
