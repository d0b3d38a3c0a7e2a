//! Unified error type for netcomm.

use netcomm_protocol::ProtocolError;
use netcomm_session::SessionError;
use netcomm_transport::TransportError;
use netcomm_wire::WireError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` variants let `?` convert sub-crate errors, so callers of
/// the `netcomm` crate only ever match on this one type.
#[derive(Debug, thiserror::Error)]
pub enum NetCommError {
    /// Encoding or decoding a payload failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Registry setup failed (duplicate reply id).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A worker failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The login did not succeed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Opening the socket failed. No worker was started.
    #[error("could not connect to {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// `connect` was called while a connection is open.
    #[error("already connected")]
    AlreadyConnected,

    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let net: NetCommError = err.into();
        assert!(matches!(net, NetCommError::Transport(_)));
        assert!(net.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let net: NetCommError = ProtocolError::DuplicateReply(0x05).into();
        assert!(matches!(net, NetCommError::Protocol(_)));
        assert!(net.to_string().contains("0x05"));
    }

    #[test]
    fn test_from_session_error() {
        let net: NetCommError =
            SessionError::TimedOut(Duration::from_millis(1000)).into();
        assert!(matches!(net, NetCommError::Session(_)));
    }

    #[test]
    fn test_connect_error_names_endpoint() {
        let net = NetCommError::Connect {
            host: "localhost".into(),
            port: 4000,
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(net.to_string(), "could not connect to localhost:4000");
        assert!(std::error::Error::source(&net).is_some());
    }
}
