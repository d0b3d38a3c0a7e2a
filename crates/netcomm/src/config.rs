//! Connection settings.

use std::time::Duration;

use netcomm_transport::TransportConfig;
use serde::{Deserialize, Serialize};

use crate::NetCommError;

/// Settings for a [`NetComm`](crate::NetComm).
///
/// Deserializes from the same camelCase keys the client's settings file
/// uses; missing keys take their defaults.
///
/// ```rust
/// use netcomm::NetConfig;
///
/// let cfg = NetConfig::from_json(r#"{ "debugProtocol": true }"#).unwrap();
/// assert!(cfg.debug_protocol);
/// assert!(!cfg.debug_network);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetConfig {
    /// Hex-dump raw traffic in both directions.
    pub debug_network: bool,
    /// Log every command sent (`SND:`) and every reply received.
    pub debug_protocol: bool,
    /// Replies decoded but not yet executed, before the receiver waits.
    pub inbound_queue_capacity: usize,
    /// Milliseconds a half-received frame may stall before it is dropped.
    pub reassembly_timeout_ms: u64,
    /// Milliseconds `disconnect` gives each worker before aborting it.
    pub shutdown_grace_ms: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            debug_network: false,
            debug_protocol: false,
            inbound_queue_capacity: 1024,
            reassembly_timeout_ms: 1000,
            shutdown_grace_ms: 100,
        }
    }
}

impl NetConfig {
    /// Parses a JSON settings object.
    ///
    /// # Errors
    /// [`NetCommError::Config`] on malformed JSON or wrongly typed keys.
    pub fn from_json(json: &str) -> Result<Self, NetCommError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Settings for the connection workers.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            network_debug: self.debug_network,
            inbound_capacity: self.inbound_queue_capacity.max(1),
            reassembly_timeout: Duration::from_millis(self.reassembly_timeout_ms),
            ..TransportConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_empty_object_is_default() {
        assert_eq!(NetConfig::from_json("{}").unwrap(), NetConfig::default());
    }

    #[test]
    fn test_from_json_reads_camel_case_keys() {
        let cfg = NetConfig::from_json(
            r#"{
                "debugNetwork": true,
                "inboundQueueCapacity": 16,
                "reassemblyTimeoutMs": 250,
                "shutdownGraceMs": 50
            }"#,
        )
        .unwrap();
        assert!(cfg.debug_network);
        assert_eq!(cfg.inbound_queue_capacity, 16);
        assert_eq!(cfg.shutdown_grace(), Duration::from_millis(50));

        let transport = cfg.transport();
        assert!(transport.network_debug);
        assert_eq!(transport.reassembly_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let err = NetConfig::from_json(r#"{ "debugNetwork": "yes" }"#);
        assert!(matches!(err, Err(NetCommError::Config(_))));
    }

    #[test]
    fn test_transport_never_zero_capacity() {
        let cfg = NetConfig {
            inbound_queue_capacity: 0,
            ..NetConfig::default()
        };
        assert_eq!(cfg.transport().inbound_capacity, 1);
    }
}
