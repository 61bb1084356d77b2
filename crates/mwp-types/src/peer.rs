// Copyright (C) 2025 Joseph Sacchini
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Peers (client configurations), their share sub-resource and public stats.

use serde::{Deserialize, Serialize};

use crate::validate::{
    optional_date, optional_gigabytes, positive_id, required, Validate, ValidationError,
};

/// One flag in a peer's status set. A peer may carry several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerStatus {
    /// Enabled and within its limits.
    Active,
    /// Disabled by an administrator.
    Inactive,
    /// Past its expiry date.
    Expired,
    /// Over its traffic limit.
    Suspended,
}

impl PeerStatus {
    /// Wire spelling, also used as the badge text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
        }
    }
}

/// A peer as returned by `GET /peer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    /// Backend identifier.
    pub id: u64,
    /// Opaque identifier used by the public share page.
    pub uuid: String,
    /// Whether the peer is administratively disabled.
    pub disabled: bool,
    /// Free-form note.
    pub comment: Option<String>,
    /// Display name.
    pub name: String,
    /// Name of the interface the peer belongs to.
    pub interface: String,
    /// Address assigned to the peer, CIDR notation.
    pub allowed_address: String,
    /// Traffic cap in GB; `None` is unlimited.
    pub traffic_limit: Option<String>,
    /// Expiry date; `None` never expires.
    pub expire_time: Option<String>,
    /// Download rate cap such as `10M`.
    pub download_bandwidth: Option<String>,
    /// Upload rate cap such as `10M`.
    pub upload_bandwidth: Option<String>,
    /// Usage so far, in GB.
    pub total_usage: String,
    /// Status flags in backend order.
    pub status: Vec<PeerStatus>,
    /// Whether a recent handshake was seen.
    pub is_online: bool,
    /// Whether the public share page is enabled.
    pub is_shared: bool,
}

/// Keys (and a proposed address) generated by `GET /peer/credentials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerCredentials {
    /// WireGuard private key.
    pub private_key: String,
    /// WireGuard public key.
    pub public_key: String,
    /// Next free address, when the backend proposes one.
    #[serde(default)]
    pub allowed_address: Option<String>,
}

/// Payload for `POST /peer/allowed-address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedAddressRequest {
    /// Interface to allocate from.
    pub interface_id: String,
}

/// Response of `POST /peer/allowed-address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedAddress {
    /// Next free address on the interface.
    pub allowed_address: String,
}

/// Share state of a peer as returned by `GET /peer/:id/share`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerShare {
    /// Whether the share page is enabled.
    pub is_shared: bool,
    /// Public link, present while shared.
    pub share_link: Option<String>,
    /// Date after which the link stops working.
    pub expire_time: Option<String>,
}

/// Usage summary served to the public share page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerStats {
    /// Peer name.
    pub name: String,
    /// Expiry date.
    pub expire_time: Option<String>,
    /// Traffic cap in GB.
    pub traffic_limit: Option<String>,
    /// Downloaded GB.
    pub download_usage: String,
    /// Uploaded GB.
    pub upload_usage: String,
    /// Total GB.
    pub total_usage: String,
    /// Share of the traffic cap consumed, when capped.
    pub usage_percent: Option<String>,
}

/// Payload for `POST /peer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePeerRequest {
    /// Free-form note.
    pub comment: Option<String>,
    /// Display name.
    pub name: String,
    /// Backend identifier of the interface, as a string.
    pub interface_id: String,
    /// Interface name.
    pub interface_name: String,
    /// Private key obtained from the credentials endpoint.
    pub private_key: String,
    /// Public key obtained from the credentials endpoint.
    pub public_key: String,
    /// Address assigned to the peer.
    pub allowed_address: String,
    /// Optional preshared key.
    pub preshared_key: Option<String>,
    /// Keepalive interval such as `00:00:25`.
    pub persistent_keepalive: Option<String>,
    /// Endpoint the peer connects to (server address).
    pub endpoint: String,
    /// Expiry date, `YYYY-MM-DD`.
    pub expire_time: Option<String>,
    /// Traffic cap in GB.
    pub traffic_limit: Option<String>,
    /// Download rate cap.
    pub download_bandwidth: Option<String>,
    /// Upload rate cap.
    pub upload_bandwidth: Option<String>,
}

impl Validate for CreatePeerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, "Name is required")?;
        required("interface_id", &self.interface_id, "Interface ID is required")?;
        required("interface_name", &self.interface_name, "Interface Name is required")?;
        required("private_key", &self.private_key, "Private Key is required")?;
        required("public_key", &self.public_key, "Public Key is required")?;
        required("allowed_address", &self.allowed_address, "Allowed Address is required")?;
        required("endpoint", &self.endpoint, "Endpoint is required")?;
        optional_date("expire_time", self.expire_time.as_deref())?;
        optional_gigabytes("traffic_limit", self.traffic_limit.as_deref())
    }
}

/// Payload for `PUT /peer/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePeerRequest {
    /// Target peer.
    pub id: u64,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Free-form note.
    pub comment: Option<String>,
    /// Display name.
    pub name: String,
    /// Address assigned to the peer.
    pub allowed_address: String,
    /// Keepalive interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_keepalive: Option<String>,
    /// Expiry date; `None` clears it.
    pub expire_time: Option<String>,
    /// Traffic cap; `None` clears it.
    pub traffic_limit: Option<String>,
    /// Download rate cap; `None` clears it.
    pub download_bandwidth: Option<String>,
    /// Upload rate cap; `None` clears it.
    pub upload_bandwidth: Option<String>,
}

impl Validate for UpdatePeerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("id", self.id)?;
        required("name", &self.name, "Name is required")?;
        required("allowed_address", &self.allowed_address, "Allowed Address is required")?;
        optional_date("expire_time", self.expire_time.as_deref())?;
        optional_gigabytes("traffic_limit", self.traffic_limit.as_deref())
    }
}

impl From<&Peer> for UpdatePeerRequest {
    fn from(p: &Peer) -> Self {
        Self {
            id: p.id,
            disabled: Some(p.disabled),
            comment: p.comment.clone(),
            name: p.name.clone(),
            allowed_address: p.allowed_address.clone(),
            persistent_keepalive: None,
            expire_time: p.expire_time.clone(),
            traffic_limit: p.traffic_limit.clone(),
            download_bandwidth: p.download_bandwidth.clone(),
            upload_bandwidth: p.upload_bandwidth.clone(),
        }
    }
}

/// Payload for `PATCH /peer/:id/share/expire`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePeerShareExpireRequest {
    /// Target peer.
    pub id: u64,
    /// New expiry; `None` removes it.
    pub expire_time: Option<String>,
}

impl Validate for UpdatePeerShareExpireRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("id", self.id)?;
        optional_date("expire_time", self.expire_time.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: &str = r#"{
        "id": 7, "uuid": "5f0c1d2e", "disabled": false, "comment": null,
        "name": "peer-alice", "interface": "wg0", "allowed_address": "10.0.0.7/32",
        "traffic_limit": "50", "expire_time": null, "download_bandwidth": "24M",
        "upload_bandwidth": null, "total_usage": "1.25",
        "status": ["active", "expired"], "is_online": true, "is_shared": false
    }"#;

    #[test]
    fn parses_multi_valued_status_in_order() {
        let peer: Peer = serde_json::from_str(PEER).unwrap();
        assert_eq!(peer.status, vec![PeerStatus::Active, PeerStatus::Expired]);
    }

    #[test]
    fn rejects_unknown_status_flag() {
        let json = PEER.replace("\"expired\"", "\"banned\"");
        assert!(serde_json::from_str::<Peer>(&json).is_err());
    }

    #[test]
    fn credentials_without_address() {
        let creds: PeerCredentials =
            serde_json::from_str(r#"{"private_key":"a","public_key":"b"}"#).unwrap();
        assert!(creds.allowed_address.is_none());
    }

    #[test]
    fn create_requires_generated_keys() {
        let req = CreatePeerRequest {
            name: "peer-bob".into(),
            interface_id: "1".into(),
            interface_name: "wg0".into(),
            allowed_address: "10.0.0.8/32".into(),
            endpoint: "192.0.2.10".into(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field, "private_key");
    }

    #[test]
    fn update_from_peer_keeps_limits() {
        let peer: Peer = serde_json::from_str(PEER).unwrap();
        let req = UpdatePeerRequest::from(&peer);
        assert!(req.validate().is_ok());
        assert_eq!(req.download_bandwidth.as_deref(), Some("24M"));
        assert_eq!(req.traffic_limit.as_deref(), Some("50"));
    }

    #[test]
    fn share_expire_checks_date() {
        let mut req = UpdatePeerShareExpireRequest {
            id: 7,
            expire_time: Some("2026-01-31".into()),
        };
        assert!(req.validate().is_ok());
        req.expire_time = Some("tomorrow".into());
        assert!(req.validate().is_err());
    }
}
