//! Commands the monitor sends to the server.
//!
//! Most commands address a character twice: by ID and by name. The
//! server checks that both match before it acts, so a stale ID cannot hit
//! the wrong character.

use std::fmt;

use netcomm_protocol::ClientCommand;
use netcomm_wire::{CharacterId, Location, Writer};

use crate::ids;

/// Keeps an idle connection from being dropped. Empty payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAliveCmd;

impl ClientCommand for KeepAliveCmd {
    fn id(&self) -> u8 {
        ids::KEEP_ALIVE
    }

    fn encode(&self, _: &mut Writer<'_>) {}
}

/// Sends a message to every player online.
#[derive(Debug, Clone)]
pub struct BroadcastCmd {
    pub message: String,
}

impl BroadcastCmd {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ClientCommand for BroadcastCmd {
    fn id(&self) -> u8 {
        ids::BROADCAST
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write_string(&self.message);
    }
}

/// Bans a character.
#[derive(Debug, Clone)]
pub struct BanCharCmd {
    pub char_id: CharacterId,
    pub name: String,
    /// Ban length as the server counts it.
    pub duration: u32,
}

impl ClientCommand for BanCharCmd {
    fn id(&self) -> u8 {
        ids::BAN_CHAR
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
        w.write_uint(self.duration);
    }
}

/// Sets one attribute of a character.
#[derive(Debug, Clone)]
pub struct ChangeAttributeCmd {
    pub char_id: CharacterId,
    pub name: String,
    /// Server-side attribute name, e.g. `hitpoints`.
    pub attribute: String,
    pub value: u16,
}

impl ClientCommand for ChangeAttributeCmd {
    fn id(&self) -> u8 {
        ids::CHANGE_ATTRIBUTE
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
        w.write_string(&self.attribute);
        w.write_ushort(self.value);
    }
}

/// Asks for all attributes of a character.
///
/// Shares its ID with [`ChangeAttributeCmd`]; the server tells them apart
/// by payload length.
#[derive(Debug, Clone)]
pub struct RequestAttributesCmd {
    pub char_id: CharacterId,
    pub name: String,
}

impl ClientCommand for RequestAttributesCmd {
    fn id(&self) -> u8 {
        ids::REQUEST_ATTRIBUTES
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
    }
}

/// Sets one skill of a character.
#[derive(Debug, Clone)]
pub struct ChangeSkillCmd {
    pub char_id: CharacterId,
    pub name: String,
    pub skill: u8,
    pub value: u16,
}

impl ClientCommand for ChangeSkillCmd {
    fn id(&self) -> u8 {
        ids::CHANGE_SKILL
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
        w.write_ubyte(self.skill);
        w.write_ushort(self.value);
    }
}

/// A server-wide administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    ImportMaps,
    KickAll,
    /// Stop accepting logins.
    SetLoginFalse,
    SetLoginTrue,
    Nuke,
    Reload,
}

impl ServerAction {
    /// The command word the server expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImportMaps => "importmaps",
            Self::KickAll => "kickall",
            Self::SetLoginFalse => "setloginfalse",
            Self::SetLoginTrue => "setlogintrue",
            Self::Nuke => "nuke",
            Self::Reload => "reload",
        }
    }
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs a [`ServerAction`].
#[derive(Debug, Clone, Copy)]
pub struct ServerCmd {
    pub action: ServerAction,
}

impl ServerCmd {
    pub fn new(action: ServerAction) -> Self {
        Self { action }
    }
}

impl ClientCommand for ServerCmd {
    fn id(&self) -> u8 {
        ids::SERVER_COMMAND
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write_string(self.action.as_str());
    }
}

/// Moves a character to another location.
#[derive(Debug, Clone)]
pub struct WarpCmd {
    pub char_id: CharacterId,
    pub name: String,
    pub target: Location,
}

impl ClientCommand for WarpCmd {
    fn id(&self) -> u8 {
        ids::WARP
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
        w.write(&self.target);
    }
}

/// Makes a character say something.
#[derive(Debug, Clone)]
pub struct SpeakAsCmd {
    pub char_id: CharacterId,
    pub name: String,
    pub message: String,
}

impl ClientCommand for SpeakAsCmd {
    fn id(&self) -> u8 {
        ids::SPEAK_AS
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write(&self.char_id);
        w.write_string(&self.name);
        w.write_string(&self.message);
    }
}

/// Logs the monitor in. Answered by a login-successful or a disconnect
/// reply.
#[derive(Clone)]
pub struct LoginCmd {
    pub user: String,
    pub password: String,
    pub client_version: u8,
}

impl LoginCmd {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        client_version: u8,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            client_version,
        }
    }
}

// The password must not end up in protocol logs.
impl fmt::Debug for LoginCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCmd")
            .field("user", &self.user)
            .field("password", &"***")
            .field("client_version", &self.client_version)
            .finish()
    }
}

impl ClientCommand for LoginCmd {
    fn id(&self) -> u8 {
        ids::LOGIN
    }

    fn encode(&self, w: &mut Writer<'_>) {
        w.write_ubyte(self.client_version);
        w.write_string(&self.user);
        w.write_string(&self.password);
    }
}
