//! Replies the server sends to the monitor.
//!
//! Every reply decodes its fields in wire order and, when executed,
//! publishes one [`MonitorEvent`]. The login and disconnect replies also
//! resolve the login rendezvous.

use netcomm_protocol::ServerReply;
use netcomm_session::DisconnectReason;
use netcomm_wire::{CharacterId, Location, Reader, WireError};

use crate::{MonitorContext, MonitorEvent, TalkType};

/// The server accepted the login. Empty payload.
#[derive(Debug, Default)]
pub struct LoginSuccessfulMsg;

impl ServerReply<MonitorContext> for LoginSuccessfulMsg {
    fn decode(&mut self, _: &mut Reader<'_>) -> Result<(), WireError> {
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.login().report_login_success();
        ctx.publish(MonitorEvent::LoginSuccessful);
        true
    }
}

/// A player entered the game.
#[derive(Debug, Default)]
pub struct PlayerLoginMsg {
    pub char_id: CharacterId,
    pub name: String,
    pub location: Location,
}

impl ServerReply<MonitorContext> for PlayerLoginMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.name = r.read_string()?;
        self.location = r.read()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerLogin {
            char_id: self.char_id,
            name: std::mem::take(&mut self.name),
            location: self.location,
        });
        true
    }
}

/// A player said something.
#[derive(Debug, Default)]
pub struct PlayerTalkMsg {
    pub char_id: CharacterId,
    pub name: String,
    pub message: String,
    pub talk_type: u8,
}

impl ServerReply<MonitorContext> for PlayerTalkMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.name = r.read_string()?;
        self.message = r.read_string()?;
        self.talk_type = r.read_ubyte()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerTalk {
            char_id: self.char_id,
            name: std::mem::take(&mut self.name),
            message: std::mem::take(&mut self.message),
            talk_type: TalkType::from(self.talk_type),
        });
        true
    }
}

/// A player left the game.
#[derive(Debug, Default)]
pub struct PlayerLogoutMsg {
    pub char_id: CharacterId,
}

impl ServerReply<MonitorContext> for PlayerLogoutMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerLogout {
            char_id: self.char_id,
        });
        true
    }
}

/// A player moved.
#[derive(Debug, Default)]
pub struct PlayerLocationMsg {
    pub char_id: CharacterId,
    pub location: Location,
}

impl ServerReply<MonitorContext> for PlayerLocationMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.location = r.read()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerLocation {
            char_id: self.char_id,
            location: self.location,
        });
        true
    }
}

/// One attribute of a player changed.
#[derive(Debug, Default)]
pub struct PlayerAttributeMsg {
    pub char_id: CharacterId,
    pub attribute: String,
    pub value: u16,
}

impl ServerReply<MonitorContext> for PlayerAttributeMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.attribute = r.read_string()?;
        self.value = r.read_ushort()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerAttribute {
            char_id: self.char_id,
            attribute: std::mem::take(&mut self.attribute),
            value: self.value,
        });
        true
    }
}

/// One skill of a player changed.
#[derive(Debug, Default)]
pub struct PlayerSkillMsg {
    pub char_id: CharacterId,
    pub skill: u8,
    pub value: u16,
    pub minor: u16,
}

impl ServerReply<MonitorContext> for PlayerSkillMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.skill = r.read_ubyte()?;
        self.value = r.read_ushort()?;
        self.minor = r.read_ushort()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerSkill {
            char_id: self.char_id,
            skill: self.skill,
            value: self.value,
            minor: self.minor,
        });
        true
    }
}

/// A player did something noteworthy.
#[derive(Debug, Default)]
pub struct PlayerActionMsg {
    pub char_id: CharacterId,
    pub name: String,
    pub action_type: u8,
    pub message: String,
}

impl ServerReply<MonitorContext> for PlayerActionMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.char_id = r.read()?;
        self.name = r.read_string()?;
        self.action_type = r.read_ubyte()?;
        self.message = r.read_string()?;
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::PlayerAction {
            char_id: self.char_id,
            name: std::mem::take(&mut self.name),
            action_type: self.action_type,
            message: std::mem::take(&mut self.message),
        });
        true
    }
}

/// The server is closing the session, or refusing the login.
#[derive(Debug)]
pub struct DisconnectMsg {
    pub reason: DisconnectReason,
}

impl Default for DisconnectMsg {
    fn default() -> Self {
        Self {
            reason: DisconnectReason::Unknown(0),
        }
    }
}

impl ServerReply<MonitorContext> for DisconnectMsg {
    fn decode(&mut self, r: &mut Reader<'_>) -> Result<(), WireError> {
        self.reason = DisconnectReason::from_code(r.read_ubyte()?);
        Ok(())
    }

    fn execute_update(&mut self, ctx: &MonitorContext) -> bool {
        ctx.publish(MonitorEvent::Disconnected {
            reason: self.reason,
        });
        ctx.login().report_disconnect(self.reason);
        true
    }
}
