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

//! The hooks layer: one method per screen action, wiring the API client,
//! the query cache, the session and the event bus together.

use std::sync::Arc;

use mwp_types::auth::{LoginRequest, LoginResponse, UpdateProfileRequest};
use mwp_types::dashboard::{DeviceData, TrafficUsage};
use mwp_types::interface::{CreateInterfaceRequest, Interface, UpdateInterfaceRequest};
use mwp_types::ip_pool::IpPool;
use mwp_types::peer::{Peer, PeerShare, PeerStats, UpdatePeerShareExpireRequest};
use mwp_types::server::{CreateServerRequest, Server, UpdateServerRequest};
use mwp_types::ValidationError;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, QrImage};
use crate::config::{Config, ConfigError};
use crate::confirm::{Deletable, DeleteConfirmation};
use crate::events::{EventBus, Route};
use crate::forms::{IpPoolForm, IpPoolSubmission, PeerForm, PeerSubmission};
use crate::query::{Mutation, QueryClient, QueryKey, Resource, RetryPolicy};
use crate::session::{Admin, CookieJar, SessionError, SessionStore};

/// Days of traffic shown on the dashboard chart.
pub const DASHBOARD_TRAFFIC_RANGE: u32 = 90;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("type {expected:?} to confirm")]
    ConfirmationMismatch { expected: String },

    #[error("only one server can be managed; delete the existing one first")]
    ServerLimit,
}

impl From<ValidationError> for PanelError {
    fn from(e: ValidationError) -> Self {
        Self::Api(ApiError::Validation(e))
    }
}

#[derive(Debug, Clone)]
pub struct Panel {
    api: ApiClient,
    queries: Arc<QueryClient>,
    events: EventBus,
}

impl Panel {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        session: SessionStore,
        retry: RetryPolicy,
    ) -> Self {
        let events = EventBus::default();
        let api = ApiClient::new(http, base_url, Arc::new(session));
        let queries = Arc::new(QueryClient::new(retry, events.clone()));
        Self {
            api,
            queries,
            events,
        }
    }

    /// Load the persisted session and build a client for `config`.
    pub async fn from_config(config: &Config) -> Result<Self, PanelError> {
        let jar = CookieJar::load(&config.session_path).await?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("mwp-panel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PanelError::Client)?;
        info!(base_url = %config.base_url, profile = %config.profile, "panel ready");
        Ok(Self::new(
            http,
            config.base_url.clone(),
            SessionStore::load(jar),
            RetryPolicy::for_profile(config.profile),
        ))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    // -- Auth --

    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, PanelError> {
        let resp = self.queries.mutate(Mutation::Login, self.api.login(req)).await?;
        let session = self.session();
        session.set_access_token(&resp.access_token).await?;
        session
            .set_admin(Admin {
                user_id: None,
                username: req.username.clone(),
            })
            .await?;
        Ok(resp)
    }

    /// A changed profile invalidates the current token, so the admin has to
    /// sign in again.
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::UpdateProfile, self.api.update_profile(req))
            .await?;
        self.session().reset_access_token().await?;
        self.events.navigate(Route::SignIn, false);
        self.events.notify_success("Account updated successfully.");
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), PanelError> {
        self.session().reset().await?;
        self.events.navigate(Route::SignIn, false);
        Ok(())
    }

    // -- Dashboard --

    pub async fn device_data(&self) -> Result<Arc<DeviceData>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::new(Resource::DeviceData), move || api.fetch_device_data())
            .await?)
    }

    pub async fn daily_traffic_usage(&self, range: Option<u32>) -> Result<Arc<Vec<TrafficUsage>>, PanelError> {
        let range = range.unwrap_or(DASHBOARD_TRAFFIC_RANGE);
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::DailyTrafficUsage, range), move || {
                api.fetch_daily_traffic_usage(Some(range))
            })
            .await?)
    }

    // -- Servers --

    pub async fn servers(&self) -> Result<Arc<Vec<Server>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::new(Resource::ServersList), move || api.fetch_servers_list())
            .await?)
    }

    pub async fn refresh_servers(&self) -> Result<Arc<Vec<Server>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .refetch(QueryKey::new(Resource::ServersList), move || api.fetch_servers_list())
            .await?)
    }

    /// Only a single managed server is supported.
    pub async fn can_add_server(&self) -> Result<bool, PanelError> {
        Ok(self.servers().await?.is_empty())
    }

    pub async fn create_server(&self, req: &CreateServerRequest) -> Result<Server, PanelError> {
        if !self.can_add_server().await? {
            warn!("refusing to add a second server");
            return Err(PanelError::ServerLimit);
        }
        let server = self
            .queries
            .mutate(Mutation::CreateServer, self.api.create_server(req))
            .await?;
        self.events.notify_success("Server created successfully.");
        Ok(server)
    }

    pub async fn update_server(&self, req: &UpdateServerRequest) -> Result<Server, PanelError> {
        let server = self
            .queries
            .mutate(Mutation::UpdateServer, self.api.update_server(req))
            .await?;
        self.events.notify_success("Server updated successfully.");
        Ok(server)
    }

    pub async fn toggle_server(&self, server: &Server) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::UpdateServerStatus, self.api.update_server_status(server.id))
            .await?;
        let verb = if server.is_active { "disabled" } else { "enabled" };
        self.events.notify_success(format!("Server {verb} successfully"));
        Ok(())
    }

    // -- Interfaces --

    pub async fn interfaces(&self) -> Result<Arc<Vec<Interface>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::new(Resource::InterfacesList), move || api.fetch_interfaces_list())
            .await?)
    }

    pub async fn refresh_interfaces(&self) -> Result<Arc<Vec<Interface>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .refetch(QueryKey::new(Resource::InterfacesList), move || api.fetch_interfaces_list())
            .await?)
    }

    pub async fn create_interface(&self, req: &CreateInterfaceRequest) -> Result<Interface, PanelError> {
        let iface = self
            .queries
            .mutate(Mutation::CreateInterface, self.api.create_interface(req))
            .await?;
        self.events.notify_success("Interface created successfully.");
        Ok(iface)
    }

    pub async fn update_interface(&self, req: &UpdateInterfaceRequest) -> Result<Interface, PanelError> {
        let iface = self
            .queries
            .mutate(Mutation::UpdateInterface, self.api.update_interface(req))
            .await?;
        self.events.notify_success("Interface updated successfully.");
        Ok(iface)
    }

    pub async fn toggle_interface(&self, iface: &Interface) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::UpdateInterfaceStatus, self.api.update_interface_status(iface.id))
            .await?;
        let verb = if iface.disabled { "enabled" } else { "disabled" };
        self.events.notify_success(format!("Interface {verb} successfully"));
        Ok(())
    }

    /// Backend reconciliation with the router, not a cache refresh.
    pub async fn sync_interfaces(&self) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::SyncInterfaces, self.api.sync_interfaces())
            .await?;
        Ok(())
    }

    // -- IP pools --

    pub async fn ip_pools(&self) -> Result<Arc<Vec<IpPool>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::new(Resource::IpPoolsList), move || api.fetch_ip_pools_list())
            .await?)
    }

    pub async fn refresh_ip_pools(&self) -> Result<Arc<Vec<IpPool>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .refetch(QueryKey::new(Resource::IpPoolsList), move || api.fetch_ip_pools_list())
            .await?)
    }

    /// Preselect the first interface on a new pool form.
    pub async fn prepare_ip_pool_form(&self, form: &mut IpPoolForm) -> Result<(), PanelError> {
        if !form.mode.is_edit() {
            let interfaces = self.interfaces().await?;
            form.apply_defaults(&interfaces);
        }
        Ok(())
    }

    pub async fn submit_ip_pool(&self, form: &IpPoolForm) -> Result<IpPool, PanelError> {
        let pool = match form.submission() {
            IpPoolSubmission::Create(req) => {
                let pool = self
                    .queries
                    .mutate(Mutation::CreateIpPool, self.api.create_ip_pool(&req))
                    .await?;
                self.events.notify_success("Pool created successfully.");
                pool
            }
            IpPoolSubmission::Update(req) => {
                let pool = self
                    .queries
                    .mutate(Mutation::UpdateIpPool, self.api.update_ip_pool(&req))
                    .await?;
                self.events.notify_success("Pool updated successfully.");
                pool
            }
        };
        Ok(pool)
    }

    // -- Peers --

    pub async fn peers(&self) -> Result<Arc<Vec<Peer>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::new(Resource::PeersList), move || api.fetch_peers_list())
            .await?)
    }

    pub async fn refresh_peers(&self) -> Result<Arc<Vec<Peer>>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .refetch(QueryKey::new(Resource::PeersList), move || api.fetch_peers_list())
            .await?)
    }

    /// Fill a new peer form: fresh interface and server lists for the
    /// defaults, then a key pair and address from the backend. Edit forms
    /// are left alone.
    pub async fn prepare_peer_form(&self, form: &mut PeerForm) -> Result<(), PanelError> {
        if form.mode.is_edit() {
            return Ok(());
        }
        let (interfaces, servers) =
            futures::try_join!(self.refresh_interfaces(), self.refresh_servers())?;
        form.apply_defaults(&interfaces, &servers);

        if form.needs_credentials() {
            let creds = self
                .api
                .fetch_peer_credentials()
                .await
                .inspect_err(|e| self.queries.report(e))?;
            form.apply_credentials(&creds);
        }
        Ok(())
    }

    /// Ask the backend for the next free address on `iface` and put it in
    /// the form.
    pub async fn change_peer_interface(&self, form: &mut PeerForm, iface: &Interface) -> Result<(), PanelError> {
        form.select_interface(iface);
        let addr = self
            .queries
            .mutate(
                Mutation::FetchPeerAllowedAddress,
                self.api.fetch_peer_allowed_address(&form.interface_id),
            )
            .await?;
        form.apply_allowed_address(&addr);
        Ok(())
    }

    pub async fn submit_peer(&self, form: &PeerForm) -> Result<Peer, PanelError> {
        let peer = match form.submission()? {
            PeerSubmission::Create(req) => {
                let peer = self
                    .queries
                    .mutate(Mutation::CreatePeer, self.api.create_peer(&req))
                    .await?;
                self.events.notify_success("Peer created successfully.");
                peer
            }
            PeerSubmission::Update(req) => {
                let peer = self
                    .queries
                    .mutate(Mutation::UpdatePeer, self.api.update_peer(&req))
                    .await?;
                self.events.notify_success("Peer updated successfully.");
                peer
            }
        };
        Ok(peer)
    }

    pub async fn toggle_peer(&self, peer: &Peer) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::UpdatePeerStatus, self.api.update_peer_status(peer.id))
            .await?;
        let verb = if peer.disabled { "enabled" } else { "disabled" };
        self.events.notify_success(format!("Peer {verb} successfully"));
        Ok(())
    }

    pub async fn peer_config(&self, id: u64) -> Result<Arc<String>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::PeerConfig, id), move || api.fetch_peer_config(id))
            .await?)
    }

    pub async fn peer_qrcode(&self, id: u64) -> Result<Arc<QrImage>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::PeerQrCode, id), move || api.fetch_peer_qrcode(id))
            .await?)
    }

    pub async fn peer_share(&self, id: u64) -> Result<Arc<PeerShare>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::PeerShare, id), move || api.fetch_peer_share(id))
            .await?)
    }

    pub async fn toggle_peer_share(&self, id: u64) -> Result<(), PanelError> {
        let was_shared = self
            .queries
            .cached::<PeerShare>(&QueryKey::with(Resource::PeerShare, id))
            .is_some_and(|s| s.is_shared);
        self.queries
            .mutate(Mutation::UpdatePeerShareStatus, self.api.update_peer_share_status(id))
            .await?;
        self.events.notify_success(if was_shared {
            "Peer sharing stopped successfully"
        } else {
            "Peer sharing started successfully"
        });
        Ok(())
    }

    pub async fn update_peer_share_expire(&self, req: &UpdatePeerShareExpireRequest) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::UpdatePeerShareExpire, self.api.update_peer_share_expire(req))
            .await?;
        self.events.notify_success(if req.expire_time.is_some() {
            "Expiration date updated successfully"
        } else {
            "Expiration date cleared successfully"
        });
        Ok(())
    }

    pub async fn reset_peer_usage(&self, peer: &Peer) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::ResetPeerUsage, self.api.reset_peer_usage(peer.id))
            .await?;
        self.events
            .notify_success(format!("Usage of {} reset successfully", peer.name));
        Ok(())
    }

    /// Confirmed primary action: zero the counters of every peer.
    pub async fn reset_peer_usages(&self) -> Result<(), PanelError> {
        self.queries
            .mutate(Mutation::ResetPeerUsages, self.api.reset_peer_usages())
            .await?;
        self.events.notify_success("Peer usages reset successfully");
        Ok(())
    }

    pub async fn sync_peers(&self) -> Result<(), PanelError> {
        self.queries.mutate(Mutation::SyncPeers, self.api.sync_peers()).await?;
        Ok(())
    }

    // -- Deletes --

    /// Delete `entity` once `typed` matches its name.
    pub async fn delete_confirmed<E: Deletable>(&self, entity: &E, typed: &str) -> Result<(), PanelError> {
        let mut confirmation = DeleteConfirmation::for_entity(entity);
        confirmation.type_value(typed);
        if !confirmation.is_enabled() {
            return Err(PanelError::ConfirmationMismatch {
                expected: confirmation.name().to_string(),
            });
        }
        self.queries
            .mutate(E::MUTATION, E::delete(&self.api, entity.id()))
            .await?;
        self.events.notify_success(confirmation.success_message());
        Ok(())
    }

    pub async fn delete_server_confirmed(&self, server: &Server, typed: &str) -> Result<(), PanelError> {
        self.delete_confirmed(server, typed).await
    }

    pub async fn delete_interface_confirmed(&self, iface: &Interface, typed: &str) -> Result<(), PanelError> {
        self.delete_confirmed(iface, typed).await
    }

    pub async fn delete_ip_pool_confirmed(&self, pool: &IpPool, typed: &str) -> Result<(), PanelError> {
        self.delete_confirmed(pool, typed).await
    }

    pub async fn delete_peer_confirmed(&self, peer: &Peer, typed: &str) -> Result<(), PanelError> {
        self.delete_confirmed(peer, typed).await
    }

    // -- Public share page --

    pub async fn user_details(&self, uuid: &str) -> Result<Arc<PeerStats>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::UserDetails, uuid), move || api.fetch_user_details(uuid))
            .await?)
    }

    pub async fn user_config(&self, uuid: &str) -> Result<Arc<String>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::UserConfig, uuid), move || api.fetch_user_config(uuid))
            .await?)
    }

    pub async fn user_qrcode(&self, uuid: &str) -> Result<Arc<QrImage>, PanelError> {
        let api = &self.api;
        Ok(self
            .queries
            .fetch(QueryKey::with(Resource::UserQrCode, uuid), move || api.fetch_user_qrcode(uuid))
            .await?)
    }
}
