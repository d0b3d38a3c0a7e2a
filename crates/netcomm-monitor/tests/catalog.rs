//! Field layout tests for every monitor command and reply.
//!
//! Commands are encoded into a real frame and read back field by field
//! with a `Reader`, the way the server would. Replies are built with a
//! `Writer`, decoded through the registry, executed, and checked by the
//! event they publish.

use bytes::BytesMut;
use netcomm_monitor::commands::*;
use netcomm_monitor::{ids, monitor_registry, MonitorContext, MonitorEvent, TalkType};
use netcomm_protocol::{encode_command, ClientCommand};
use netcomm_session::DisconnectReason;
use netcomm_wire::{
    encode_frame, CharacterId, FrameDecoder, Location, RawFrame, Reader, Writer,
};

fn round_trip(cmd: &dyn ClientCommand) -> RawFrame {
    let mut buf = BytesMut::new();
    encode_command(cmd, &mut buf).unwrap();
    let mut decoder = FrameDecoder::new();
    decoder.extend(&buf);
    let frame = decoder.next_frame().expect("one complete frame");
    assert_eq!(decoder.buffered(), 0);
    frame
}

/// Decodes and executes one reply, returning the event it published.
fn execute(id: u8, body: impl FnOnce(&mut Writer<'_>)) -> (MonitorContext, MonitorEvent) {
    let mut buf = BytesMut::new();
    encode_frame(id, &mut buf, body).unwrap();
    let payload = &buf[netcomm_wire::HEADER_SIZE..];

    let registry = monitor_registry().unwrap();
    let (ctx, mut events) = MonitorContext::new(8);
    let mut reply = registry
        .decode(id, payload)
        .expect("registered id")
        .expect("payload decodes");
    assert!(reply.process_now(&ctx));
    assert!(reply.execute_update(&ctx));
    let event = events.try_recv().expect("one event published");
    (ctx, event)
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn test_keep_alive_has_empty_payload() {
    let frame = round_trip(&KeepAliveCmd);
    assert_eq!(frame.id, 0x01);
    assert!(frame.payload.is_empty());
}

#[test]
fn test_broadcast_fields() {
    let frame = round_trip(&BroadcastCmd::new("server restart in 5 minutes"));
    assert_eq!(frame.id, 0x02);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read_string().unwrap(), "server restart in 5 minutes");
    assert!(r.is_empty());
}

#[test]
fn test_ban_char_fields() {
    let frame = round_trip(&BanCharCmd {
        char_id: CharacterId(0x0102_0304),
        name: "Grim".into(),
        duration: 3600,
    });
    assert_eq!(frame.id, 0x04);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(0x0102_0304));
    assert_eq!(r.read_string().unwrap(), "Grim");
    assert_eq!(r.read_uint().unwrap(), 3600);
    assert!(r.is_empty());
}

#[test]
fn test_change_attribute_and_request_share_id() {
    let change = round_trip(&ChangeAttributeCmd {
        char_id: CharacterId(9),
        name: "Ada".into(),
        attribute: "hitpoints".into(),
        value: 10_000,
    });
    let request = round_trip(&RequestAttributesCmd {
        char_id: CharacterId(9),
        name: "Ada".into(),
    });
    assert_eq!(change.id, 0x06);
    assert_eq!(request.id, 0x06);

    let mut r = Reader::new(&change.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(9));
    assert_eq!(r.read_string().unwrap(), "Ada");
    assert_eq!(r.read_string().unwrap(), "hitpoints");
    assert_eq!(r.read_ushort().unwrap(), 10_000);
    assert!(r.is_empty());

    let mut r = Reader::new(&request.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(9));
    assert_eq!(r.read_string().unwrap(), "Ada");
    assert!(r.is_empty());
}

#[test]
fn test_change_skill_fields() {
    let frame = round_trip(&ChangeSkillCmd {
        char_id: CharacterId(3),
        name: "Bo".into(),
        skill: 17,
        value: 55,
    });
    assert_eq!(frame.id, 0x07);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(3));
    assert_eq!(r.read_string().unwrap(), "Bo");
    assert_eq!(r.read_ubyte().unwrap(), 17);
    assert_eq!(r.read_ushort().unwrap(), 55);
    assert!(r.is_empty());
}

#[test]
fn test_server_command_word() {
    let frame = round_trip(&ServerCmd::new(ServerAction::Reload));
    assert_eq!(frame.id, 0x08);
    assert_eq!(Reader::new(&frame.payload).read_string().unwrap(), "reload");
}

#[test]
fn test_warp_fields() {
    let frame = round_trip(&WarpCmd {
        char_id: CharacterId(5),
        name: "Cy".into(),
        target: Location::new(-12, 300, 1),
    });
    assert_eq!(frame.id, 0x09);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(5));
    assert_eq!(r.read_string().unwrap(), "Cy");
    assert_eq!(r.read::<Location>().unwrap(), Location::new(-12, 300, 1));
    assert!(r.is_empty());
}

#[test]
fn test_speak_as_fields() {
    let frame = round_trip(&SpeakAsCmd {
        char_id: CharacterId(8),
        name: "Dee".into(),
        message: "Grüße".into(),
    });
    assert_eq!(frame.id, 0x0A);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read::<CharacterId>().unwrap(), CharacterId(8));
    assert_eq!(r.read_string().unwrap(), "Dee");
    assert_eq!(r.read_string().unwrap(), "Grüße");
    assert!(r.is_empty());
}

#[test]
fn test_login_fields_version_first() {
    let frame = round_trip(&LoginCmd::new("alice", "secret", 122));
    assert_eq!(frame.id, ids::LOGIN);
    let mut r = Reader::new(&frame.payload);
    assert_eq!(r.read_ubyte().unwrap(), 122);
    assert_eq!(r.read_string().unwrap(), "alice");
    assert_eq!(r.read_string().unwrap(), "secret");
    assert!(r.is_empty());
}

// =========================================================================
// Replies
// =========================================================================

#[test]
fn test_player_login_event() {
    let (_, event) = execute(0x02, |w| {
        w.write(&CharacterId(42));
        w.write_string("Ada");
        w.write(&Location::new(1, 2, 0));
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerLogin {
            char_id: CharacterId(42),
            name: "Ada".into(),
            location: Location::new(1, 2, 0),
        }
    );
}

#[test]
fn test_player_talk_event() {
    let (_, event) = execute(0x03, |w| {
        w.write(&CharacterId(1));
        w.write_string("Bo");
        w.write_string("hello");
        w.write_ubyte(2);
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerTalk {
            char_id: CharacterId(1),
            name: "Bo".into(),
            message: "hello".into(),
            talk_type: TalkType::Shout,
        }
    );
}

#[test]
fn test_player_logout_event() {
    let (_, event) = execute(0x04, |w| w.write(&CharacterId(77)));
    assert_eq!(
        event,
        MonitorEvent::PlayerLogout {
            char_id: CharacterId(77)
        }
    );
}

#[test]
fn test_player_location_event() {
    let (_, event) = execute(0x05, |w| {
        w.write(&CharacterId(2));
        w.write(&Location::new(-5, 6, -1));
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerLocation {
            char_id: CharacterId(2),
            location: Location::new(-5, 6, -1),
        }
    );
}

#[test]
fn test_player_attribute_event() {
    let (_, event) = execute(0x06, |w| {
        w.write(&CharacterId(2));
        w.write_string("mana");
        w.write_ushort(9000);
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerAttribute {
            char_id: CharacterId(2),
            attribute: "mana".into(),
            value: 9000,
        }
    );
}

#[test]
fn test_player_skill_event() {
    let (_, event) = execute(0x07, |w| {
        w.write(&CharacterId(3));
        w.write_ubyte(12);
        w.write_ushort(40);
        w.write_ushort(7);
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerSkill {
            char_id: CharacterId(3),
            skill: 12,
            value: 40,
            minor: 7,
        }
    );
}

#[test]
fn test_player_action_event_type_before_message() {
    let (_, event) = execute(0x08, |w| {
        w.write(&CharacterId(4));
        w.write_string("Cy");
        w.write_ubyte(1);
        w.write_string("opened a chest");
    });
    assert_eq!(
        event,
        MonitorEvent::PlayerAction {
            char_id: CharacterId(4),
            name: "Cy".into(),
            action_type: 1,
            message: "opened a chest".into(),
        }
    );
}

#[test]
fn test_login_successful_resolves_pending_login() {
    struct NoTeardown;
    impl netcomm_session::Teardown for NoTeardown {
        fn teardown(&self) {}
    }

    let registry = monitor_registry().unwrap();
    let (ctx, mut events) = MonitorContext::new(8);
    ctx.login().start_login(std::sync::Arc::new(NoTeardown));

    let mut reply = registry.decode(0x00, &[]).unwrap().unwrap();
    assert!(reply.execute_update(&ctx));

    assert!(ctx.login().is_login_successful());
    assert_eq!(events.try_recv().unwrap(), MonitorEvent::LoginSuccessful);
}

#[test]
fn test_disconnect_event_carries_reason() {
    let (ctx, event) = execute(0xCC, |w| w.write_ubyte(0x04));
    assert_eq!(
        event,
        MonitorEvent::Disconnected {
            reason: DisconnectReason::ServerShutdown
        }
    );
    assert!(!ctx.login().is_login_successful());
}

#[test]
fn test_truncated_reply_fails_to_decode() {
    let registry = monitor_registry().unwrap();
    // Character ID only, name missing.
    let result = registry.decode(0x02, &[0, 0, 0, 1]).unwrap();
    assert!(result.is_err());
}

#[test]
fn test_event_json_shape() {
    let event = MonitorEvent::PlayerTalk {
        char_id: CharacterId(1),
        name: "Bo".into(),
        message: "hi".into(),
        talk_type: TalkType::Whisper,
    };
    let json: serde_json::Value = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "player_talk");
    assert_eq!(json["char_id"], 1);
    assert_eq!(json["talk_type"], "whisper");
}
