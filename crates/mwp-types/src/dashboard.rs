//! Dashboard aggregate and traffic series.

use serde::{Deserialize, Serialize};

/// Aggregate returned by `GET /device/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceData {
    /// Server counts.
    #[serde(rename = "ServerInfo")]
    pub server_info: ServerInfo,
    /// Interface counts.
    #[serde(rename = "InterfaceInfo")]
    pub interface_info: InterfaceInfo,
    /// Peer counts and recent activity.
    #[serde(rename = "PeerInfo")]
    pub peer_info: PeerInfo,
    /// Device identity string.
    #[serde(rename = "DeviceIdentity")]
    pub device_identity: DeviceIdentity,
    /// Hardware and OS details.
    #[serde(rename = "DeviceInfo")]
    pub device_info: DeviceInfo,
    /// Public address details, when the device could resolve them.
    #[serde(rename = "DeviceIPv4Address")]
    pub ipv4_address: Option<DeviceIpv4Address>,
    /// Resolver configuration.
    #[serde(rename = "DNSConfig")]
    pub dns_config: Option<DnsConfig>,
}

/// Server counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Registered servers.
    pub total_servers: u64,
    /// Servers marked active.
    pub active_servers: u64,
}

/// Interface counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Known interfaces.
    pub total_interfaces: u64,
    /// Interfaces not disabled.
    pub active_interfaces: u64,
}

/// Peer counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Peers seen online recently, newest first.
    pub recent_online_peers: Option<Vec<RecentOnlinePeer>>,
    /// Known peers.
    pub total_peers: u64,
    /// Peers with a recent handshake.
    pub online_peers: u64,
    /// Peers without a recent handshake.
    pub offline_peers: u64,
    /// Administratively disabled peers.
    pub disabled_peers: u64,
}

/// One entry of the recently-online list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentOnlinePeer {
    /// Peer name.
    pub name: String,
    /// Time since the last handshake, as rendered by the device.
    pub last_seen: String,
}

/// Device identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Configured identity (hostname).
    pub identity: String,
}

/// Hardware and OS details. Sizes are byte counts encoded as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Board model.
    pub board_name: String,
    /// OS version.
    pub os_version: String,
    /// CPU architecture.
    pub cpu_arch: String,
    /// Uptime as rendered by the device.
    pub uptime: String,
    /// CPU load percentage.
    pub cpu_load: String,
    /// Total memory, bytes.
    pub total_memory: String,
    /// Free memory, bytes.
    pub free_memory: String,
    /// Total disk, bytes.
    pub total_disk: String,
    /// Free disk, bytes.
    pub free_disk: String,
}

/// Public address details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceIpv4Address {
    /// Public IPv4 address.
    #[serde(default)]
    pub ipv4: Option<String>,
    /// Provider name.
    #[serde(default)]
    pub isp: Option<String>,
}

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Comma-separated resolvers.
    pub dns_servers: String,
}

/// One day of traffic on one interface, from `GET /device/traffic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficUsage {
    /// Backend identifier of the interface.
    pub interface_id: u64,
    /// Day, `YYYY-MM-DD`.
    pub date: String,
    /// Downloaded amount.
    pub download: String,
    /// Uploaded amount.
    pub upload: String,
    /// Combined amount.
    pub total: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pascal_case_sections() {
        let json = r#"{
            "ServerInfo": {"total_servers": 1, "active_servers": 1},
            "InterfaceInfo": {"total_interfaces": 2, "active_interfaces": 1},
            "PeerInfo": {"recent_online_peers": null, "total_peers": 5,
                "online_peers": 2, "offline_peers": 3, "disabled_peers": 0},
            "DeviceIdentity": {"identity": "MikroTik"},
            "DeviceInfo": {"board_name": "hEX", "os_version": "7.14", "cpu_arch": "arm",
                "uptime": "3d4h", "cpu_load": "4", "total_memory": "268435456",
                "free_memory": "134217728", "total_disk": "16777216", "free_disk": "8388608"},
            "DeviceIPv4Address": {"ipv4": "198.51.100.7"},
            "DNSConfig": null
        }"#;
        let data: DeviceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.peer_info.total_peers, 5);
        assert!(data.peer_info.recent_online_peers.is_none());
        let ip = data.ipv4_address.unwrap();
        assert_eq!(ip.ipv4.as_deref(), Some("198.51.100.7"));
        assert!(ip.isp.is_none());
        assert!(data.dns_config.is_none());
    }
}
