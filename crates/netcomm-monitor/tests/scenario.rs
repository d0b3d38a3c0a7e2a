//! A monitor session against a scripted fake server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use netcomm::{NetComm, NetConfig};
use netcomm_monitor::commands::{KeepAliveCmd, LoginCmd};
use netcomm_monitor::{ids, monitor_registry, MonitorContext, MonitorEvent};
use netcomm_wire::{encode_frame, CharacterId, FrameDecoder, Location, Reader};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_login_then_player_events() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut decoder = FrameDecoder::new();
        let mut chunk = [0u8; 512];
        let login = loop {
            if let Some(frame) = decoder.next_frame() {
                break frame;
            }
            let n = sock.read(&mut chunk).await.unwrap();
            assert!(n > 0);
            decoder.extend(&chunk[..n]);
        };
        assert_eq!(login.id, ids::LOGIN);
        let mut r = Reader::new(&login.payload);
        assert_eq!(r.read_ubyte().unwrap(), 122);
        assert_eq!(r.read_string().unwrap(), "alice");
        assert_eq!(r.read_string().unwrap(), "secret");

        // A stray byte first: the client has to resync.
        let mut out = BytesMut::from(&[0x5A][..]);
        encode_frame(ids::LOGIN_SUCCESSFUL, &mut out, |_| {}).unwrap();
        encode_frame(ids::PLAYER_LOGIN, &mut out, |w| {
            w.write(&CharacterId(1001));
            w.write_string("Ada");
            w.write(&Location::new(10, 20, 0));
        })
        .unwrap();
        encode_frame(ids::PLAYER_LOGOUT, &mut out, |w| {
            w.write(&CharacterId(1001));
        })
        .unwrap();
        sock.write_all(&out).await.unwrap();
        sock
    });

    let (ctx, mut events) = MonitorContext::new(16);
    let ctx = Arc::new(ctx);
    let net = NetComm::new(NetConfig::default());
    net.connect("127.0.0.1", port, Arc::new(monitor_registry().unwrap()), Arc::clone(&ctx))
        .await
        .unwrap();
    net.setup_keep_alive(Duration::from_secs(30), Arc::new(KeepAliveCmd));

    let started = Instant::now();
    net.login(ctx.login(), LoginCmd::new("alice", "secret", 122), Duration::from_secs(4))
        .await
        .expect("login accepted");
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(ctx.login().is_login_successful());

    let mut seen = Vec::new();
    while seen.len() < 3 {
        let event = timeout(WAIT, events.recv()).await.unwrap().unwrap();
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            MonitorEvent::LoginSuccessful,
            MonitorEvent::PlayerLogin {
                char_id: CharacterId(1001),
                name: "Ada".into(),
                location: Location::new(10, 20, 0),
            },
            MonitorEvent::PlayerLogout {
                char_id: CharacterId(1001)
            },
        ]
    );

    let _sock = server.await.unwrap();
    net.disconnect();
}

#[tokio::test]
async fn test_login_times_out_without_answer() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let (ctx, _events) = MonitorContext::new(4);
    let ctx = Arc::new(ctx);
    let net = NetComm::new(NetConfig::default());
    net.connect("127.0.0.1", port, Arc::new(monitor_registry().unwrap()), Arc::clone(&ctx))
        .await
        .unwrap();
    let (_sock, _) = listener.accept().await.unwrap();

    let started = Instant::now();
    ctx.login().start_login(net.teardown_handle());
    net.send_command(LoginCmd::new("alice", "secret", 122));
    let ok = ctx.login().wait_until_login_done(Duration::from_millis(1000)).await;

    assert!(!ok);
    assert!(!ctx.login().is_login_successful());
    assert!(started.elapsed() >= Duration::from_millis(1000));
    net.disconnect();
}
