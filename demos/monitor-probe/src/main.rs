//! Logs in as a monitor and prints every server event as a JSON line.
//!
//! ```text
//! monitor-probe <host> <port> <user> <password> [settings.json]
//! ```
//!
//! Runs until Ctrl-C or until the server drops the connection.

use std::sync::Arc;
use std::time::Duration;

use netcomm::{ConnectionStatus, DisconnectReason, NetComm, NetConfig};
use netcomm_monitor::commands::{KeepAliveCmd, LoginCmd};
use netcomm_monitor::{monitor_registry, MonitorContext};
use tokio::sync::broadcast::error::RecvError;

const CLIENT_VERSION: u8 = 122;
const LOGIN_TIMEOUT: Duration = Duration::from_secs(4);
const KEEP_ALIVE_PERIOD: Duration = Duration::from_secs(10);

struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    config: NetConfig,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: monitor-probe <host> <port> <user> <password> [settings.json]";
    let mut next = || args.next().ok_or(usage);

    let host = next()?;
    let port = next()?.parse()?;
    let user = next()?;
    let password = next()?;
    let config = match args.next() {
        Some(path) => NetConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => NetConfig::default(),
    };
    Ok(Args {
        host,
        port,
        user,
        password,
        config,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    netcomm::init_tracing();
    let args = parse_args()?;

    let (ctx, mut events) = MonitorContext::new(256);
    let ctx = Arc::new(ctx);
    ctx.login().set_disconnect_handler(Arc::new(|reason: DisconnectReason| {
        tracing::warn!(%reason, "server closed the session");
    }));

    let net = NetComm::new(args.config).with_crash_handler(Arc::new(|worker: &str, message: &str| {
        tracing::error!(worker, message, "crash");
    }));
    net.connect(&args.host, args.port, Arc::new(monitor_registry()?), Arc::clone(&ctx))
        .await?;
    net.setup_keep_alive(KEEP_ALIVE_PERIOD, Arc::new(KeepAliveCmd));

    let login = LoginCmd::new(args.user, args.password, CLIENT_VERSION);
    if let Err(e) = net.login(ctx.login(), login, LOGIN_TIMEOUT).await {
        net.disconnect();
        return Err(e.into());
    }
    tracing::info!(host = %args.host, port = args.port, "logged in, watching");

    let mut status = net.status();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = status.changed() => {
                if changed.is_err() || *status.borrow() != ConnectionStatus::Connected {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(RecvError::Lagged(n)) => tracing::warn!(missed = n, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    net.disconnect();
    // Let the workers close the socket.
    tokio::time::sleep(net.config().shutdown_grace()).await;
    Ok(())
}
