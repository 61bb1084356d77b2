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

use mwp_types::Validate;
use mwp_types::peer::{
    AllowedAddress, AllowedAddressRequest, CreatePeerRequest, Peer, PeerCredentials, PeerShare,
    UpdatePeerRequest, UpdatePeerShareExpireRequest,
};
use reqwest::Method;
use tracing::{debug, info};

use super::{ApiClient, ApiError, QrImage};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_peers_list(&self) -> Result<Vec<Peer>, ApiError> {
        let peers: Vec<Peer> = self.get_list("/peer").await?;
        debug!(count = peers.len(), "fetched peers");
        Ok(peers)
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name, interface = %req.interface_name))]
    pub async fn create_peer(&self, req: &CreatePeerRequest) -> Result<Peer, ApiError> {
        let peer: Peer = self.send_validated(Method::POST, "/peer", req).await?;
        info!(id = peer.id, allowed_address = %peer.allowed_address, "peer created");
        Ok(peer)
    }

    #[tracing::instrument(skip(self, req), fields(id = req.id))]
    pub async fn update_peer(&self, req: &UpdatePeerRequest) -> Result<Peer, ApiError> {
        self.send_validated(Method::PUT, &format!("/peer/{}", req.id), req).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_peer(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/peer/{id}")).await?;
        info!(id, "peer deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_peer_qrcode(&self, id: u64) -> Result<QrImage, ApiError> {
        self.get_image(&format!("/peer/{id}/qrcode")).await
    }

    /// The rendered WireGuard client config, verbatim.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_peer_config(&self, id: u64) -> Result<String, ApiError> {
        self.get_text(&format!("/peer/{id}/config")).await
    }

    /// A fresh key pair and the next free address, generated by the backend.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_peer_credentials(&self) -> Result<PeerCredentials, ApiError> {
        let creds: PeerCredentials = self.get_data("/peer/credentials").await?;
        debug!(public_key = %creds.public_key, "fetched peer credentials");
        Ok(creds)
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_peer_allowed_address(&self, interface_id: &str) -> Result<AllowedAddress, ApiError> {
        let req = AllowedAddressRequest {
            interface_id: interface_id.to_string(),
        };
        self.send_data(Method::POST, "/peer/allowed-address", &req).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_peer_status(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &format!("/peer/{id}/status")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_peer_share(&self, id: u64) -> Result<PeerShare, ApiError> {
        self.get_data(&format!("/peer/{id}/share")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_peer_share_status(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &format!("/peer/{id}/share/status")).await
    }

    #[tracing::instrument(skip(self, req), fields(id = req.id, expire_time = ?req.expire_time))]
    pub async fn update_peer_share_expire(&self, req: &UpdatePeerShareExpireRequest) -> Result<(), ApiError> {
        req.validate()?;
        self.send_json_empty(Method::PATCH, &format!("/peer/{}/share/expire", req.id), req)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn reset_peer_usage(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &format!("/peer/{id}/reset-usage")).await?;
        info!(id, "peer usage reset");
        Ok(())
    }

    /// Reset the usage counters of every peer at once.
    #[tracing::instrument(skip(self))]
    pub async fn reset_peer_usages(&self) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, "/peer/reset-usage").await?;
        info!("all peer usage reset");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn sync_peers(&self) -> Result<(), ApiError> {
        self.send_empty(Method::POST, "/sync/peers").await?;
        info!("peers synced");
        Ok(())
    }
}
