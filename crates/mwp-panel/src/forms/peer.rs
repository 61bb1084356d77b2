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

use mwp_types::ValidationError;
use mwp_types::interface::Interface;
use mwp_types::peer::{AllowedAddress, CreatePeerRequest, Peer, PeerCredentials, UpdatePeerRequest};
use mwp_types::server::Server;
use tracing::debug;

use super::bandwidth::BandwidthField;
use super::{FormMode, expire_time_value, traffic_limit_value};

pub const DEFAULT_KEEPALIVE: &str = "00:00:25";

/// Editable peer fields. Optional inputs are plain strings where blank
/// means "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerForm {
    pub mode: FormMode,
    pub comment: String,
    pub name: String,
    pub interface_id: String,
    pub interface_name: String,
    pub private_key: String,
    pub public_key: String,
    pub allowed_address: String,
    pub preshared_key: String,
    pub persistent_keepalive: String,
    pub endpoint: String,
    pub expire_time: String,
    pub traffic_limit: String,
    pub download: BandwidthField,
    pub upload: BandwidthField,
    pub disabled: Option<bool>,
    defaults_applied: bool,
    credentials_applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeerSubmission {
    Create(CreatePeerRequest),
    Update(UpdatePeerRequest),
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl PeerForm {
    fn blank(mode: FormMode) -> Self {
        Self {
            mode,
            comment: String::new(),
            name: String::new(),
            interface_id: String::new(),
            interface_name: String::new(),
            private_key: String::new(),
            public_key: String::new(),
            allowed_address: String::new(),
            preshared_key: String::new(),
            persistent_keepalive: String::new(),
            endpoint: String::new(),
            expire_time: String::new(),
            traffic_limit: String::new(),
            download: BandwidthField::default(),
            upload: BandwidthField::default(),
            disabled: None,
            defaults_applied: false,
            credentials_applied: false,
        }
    }

    pub fn create() -> Self {
        Self::blank(FormMode::Create)
    }

    /// Start from an existing peer. Keys are never sent back by the backend,
    /// so edit mode does not touch them.
    pub fn edit(peer: &Peer) -> Self {
        Self {
            comment: peer.comment.clone().unwrap_or_default(),
            name: peer.name.clone(),
            interface_name: peer.interface.clone(),
            allowed_address: peer.allowed_address.clone(),
            expire_time: peer.expire_time.clone().unwrap_or_default(),
            traffic_limit: peer.traffic_limit.clone().unwrap_or_default(),
            download: BandwidthField::from_value(peer.download_bandwidth.as_deref()),
            upload: BandwidthField::from_value(peer.upload_bandwidth.as_deref()),
            disabled: Some(peer.disabled),
            ..Self::blank(FormMode::Edit { id: peer.id })
        }
    }

    /// Fill interface, endpoint and keepalive from the first interface and
    /// server. Runs at most once and only for new peers; returns whether
    /// anything was applied.
    pub fn apply_defaults(&mut self, interfaces: &[Interface], servers: &[Server]) -> bool {
        if self.mode.is_edit() || self.defaults_applied {
            return false;
        }
        let (Some(iface), Some(server)) = (interfaces.first(), servers.first()) else {
            return false;
        };
        self.select_interface(iface);
        self.endpoint = server.ip_address.clone();
        self.persistent_keepalive = DEFAULT_KEEPALIVE.to_string();
        self.defaults_applied = true;
        debug!(interface = %iface.name, endpoint = %self.endpoint, "peer form defaults applied");
        true
    }

    pub fn select_interface(&mut self, iface: &Interface) {
        self.interface_id = iface.id.to_string();
        self.interface_name = iface.name.clone();
    }

    pub fn needs_credentials(&self) -> bool {
        !self.mode.is_edit() && !self.credentials_applied
    }

    pub fn apply_credentials(&mut self, creds: &PeerCredentials) {
        self.private_key = creds.private_key.clone();
        self.public_key = creds.public_key.clone();
        if let Some(addr) = &creds.allowed_address {
            self.allowed_address = addr.clone();
        }
        self.credentials_applied = true;
    }

    pub fn apply_allowed_address(&mut self, addr: &AllowedAddress) {
        self.allowed_address = addr.allowed_address.clone();
    }

    /// Edit forms are ready immediately; create forms once keys arrived.
    pub fn is_ready(&self) -> bool {
        self.mode.is_edit() || self.credentials_applied
    }

    pub fn submission(&self) -> Result<PeerSubmission, ValidationError> {
        let expire_time = expire_time_value(&self.expire_time)?;
        let traffic_limit = traffic_limit_value(&self.traffic_limit);

        Ok(match self.mode {
            FormMode::Create => PeerSubmission::Create(CreatePeerRequest {
                comment: non_blank(&self.comment),
                name: self.name.trim().to_string(),
                interface_id: self.interface_id.clone(),
                interface_name: self.interface_name.clone(),
                private_key: self.private_key.clone(),
                public_key: self.public_key.clone(),
                allowed_address: self.allowed_address.trim().to_string(),
                preshared_key: non_blank(&self.preshared_key),
                persistent_keepalive: non_blank(&self.persistent_keepalive),
                endpoint: self.endpoint.trim().to_string(),
                expire_time,
                traffic_limit,
                download_bandwidth: self.download.value(),
                upload_bandwidth: self.upload.value(),
            }),
            FormMode::Edit { id } => PeerSubmission::Update(UpdatePeerRequest {
                id,
                disabled: self.disabled,
                comment: non_blank(&self.comment),
                name: self.name.trim().to_string(),
                allowed_address: self.allowed_address.trim().to_string(),
                persistent_keepalive: non_blank(&self.persistent_keepalive),
                expire_time,
                traffic_limit,
                download_bandwidth: self.download.value(),
                upload_bandwidth: self.upload.value(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::BandwidthUnit;
    use mwp_types::Validate;
    use mwp_types::peer::PeerStatus;
    use mwp_types::server::ServerStatus;

    fn interfaces() -> Vec<Interface> {
        ["wg0", "wg1"]
            .iter()
            .enumerate()
            .map(|(i, name)| Interface {
                id: i as u64 + 5,
                interface_id: format!("*{i}"),
                disabled: false,
                comment: None,
                name: name.to_string(),
                listen_port: "51820".into(),
                mtu: "1420".into(),
                is_running: true,
            })
            .collect()
    }

    fn servers() -> Vec<Server> {
        vec![Server {
            id: 1,
            comment: None,
            name: "edge".into(),
            ip_address: "185.51.200.10".into(),
            api_port: "443".into(),
            username: None,
            status: ServerStatus::Available,
            is_active: true,
        }]
    }

    fn credentials() -> PeerCredentials {
        PeerCredentials {
            private_key: "priv".into(),
            public_key: "pub".into(),
            allowed_address: Some("10.0.0.7/32".into()),
        }
    }

    #[test]
    fn defaults_apply_once() {
        let mut form = PeerForm::create();
        assert!(form.apply_defaults(&interfaces(), &servers()));
        assert_eq!(form.interface_id, "5");
        assert_eq!(form.interface_name, "wg0");
        assert_eq!(form.endpoint, "185.51.200.10");
        assert_eq!(form.persistent_keepalive, DEFAULT_KEEPALIVE);

        form.endpoint = "198.51.100.1".into();
        assert!(!form.apply_defaults(&interfaces(), &servers()));
        assert_eq!(form.endpoint, "198.51.100.1");
    }

    #[test]
    fn defaults_wait_for_both_lists() {
        let mut form = PeerForm::create();
        assert!(!form.apply_defaults(&interfaces(), &[]));
        assert!(form.interface_name.is_empty());
        assert!(form.apply_defaults(&interfaces(), &servers()));
    }

    #[test]
    fn create_becomes_ready_after_credentials() {
        let mut form = PeerForm::create();
        assert!(!form.is_ready());
        assert!(form.needs_credentials());

        form.apply_credentials(&credentials());

        assert!(form.is_ready());
        assert!(!form.needs_credentials());
        assert_eq!(form.allowed_address, "10.0.0.7/32");
    }

    #[test]
    fn create_submission_validates() {
        let mut form = PeerForm::create();
        form.apply_defaults(&interfaces(), &servers());
        form.apply_credentials(&credentials());
        form.name = "laptop-alice".into();
        form.download = BandwidthField::new("24", BandwidthUnit::Mb);

        let PeerSubmission::Create(req) = form.submission().unwrap() else {
            panic!("expected create payload");
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.download_bandwidth.as_deref(), Some("24M"));
        assert_eq!(req.upload_bandwidth, None);
        assert_eq!(req.comment, None);
        assert_eq!(req.persistent_keepalive.as_deref(), Some(DEFAULT_KEEPALIVE));
    }

    #[test]
    fn edit_decomposes_existing_values() {
        let peer = Peer {
            id: 12,
            uuid: "3f1c".into(),
            disabled: false,
            comment: Some("alice".into()),
            name: "laptop-alice".into(),
            interface: "wg0".into(),
            allowed_address: "10.0.0.7/32".into(),
            traffic_limit: Some("50".into()),
            expire_time: Some("2025-12-31".into()),
            download_bandwidth: Some("10M".into()),
            upload_bandwidth: Some("2G".into()),
            total_usage: "0".into(),
            status: vec![PeerStatus::Active],
            is_online: false,
            is_shared: false,
        };
        let form = PeerForm::edit(&peer);
        assert!(form.is_ready());
        assert!(!form.needs_credentials());
        assert_eq!(form.download, BandwidthField::new("10", BandwidthUnit::Mb));
        assert_eq!(form.upload, BandwidthField::new("2", BandwidthUnit::Gb));

        let PeerSubmission::Update(req) = form.submission().unwrap() else {
            panic!("expected update payload");
        };
        assert_eq!(req, UpdatePeerRequest::from(&peer));
    }

    #[test]
    fn bad_expiry_is_rejected() {
        let mut form = PeerForm::create();
        form.expire_time = "tomorrow".into();
        assert_eq!(form.submission().unwrap_err().field, "expire_time");
    }
}
