//! What the monitor publishes for each server reply.

use netcomm_session::DisconnectReason;
use netcomm_wire::{CharacterId, Location};
use serde::Serialize;

/// How a player spoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TalkType {
    Say,
    Whisper,
    Shout,
    /// A type byte this client does not know.
    Other(u8),
}

impl From<u8> for TalkType {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Say,
            1 => Self::Whisper,
            2 => Self::Shout,
            other => Self::Other(other),
        }
    }
}

/// One observable change on the server.
///
/// Serialized with an `event` tag so it can be forwarded as JSON lines:
///
/// ```rust
/// use netcomm_monitor::MonitorEvent;
/// use netcomm_wire::CharacterId;
///
/// let event = MonitorEvent::PlayerLogout { char_id: CharacterId(7) };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"event":"player_logout","char_id":7}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    LoginSuccessful,
    PlayerLogin {
        char_id: CharacterId,
        name: String,
        location: Location,
    },
    PlayerTalk {
        char_id: CharacterId,
        name: String,
        message: String,
        talk_type: TalkType,
    },
    PlayerLogout {
        char_id: CharacterId,
    },
    PlayerLocation {
        char_id: CharacterId,
        location: Location,
    },
    PlayerAttribute {
        char_id: CharacterId,
        attribute: String,
        value: u16,
    },
    PlayerSkill {
        char_id: CharacterId,
        skill: u8,
        value: u16,
        minor: u16,
    },
    PlayerAction {
        char_id: CharacterId,
        name: String,
        action_type: u8,
        message: String,
    },
    Disconnected {
        reason: DisconnectReason,
    },
}
