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

//! Cached reads and invalidating writes.
//!
//! Reads go through [`QueryClient::fetch`], which serves fresh cached data
//! and otherwise calls the backend (retrying according to the
//! [`RetryPolicy`]). Writes go through [`QueryClient::mutate`], which runs
//! once and then marks the resources listed in [`Mutation::invalidates`] as
//! stale so the next read goes back to the backend.
//!
//! A failure that reaches the caller is reported once through
//! [`QueryClient::report`]: after the last retry of a read, or straight
//! away for a write.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::config::BuildProfile;
use crate::events::{EventBus, Route};

/// How long a successful read is served from cache.
pub const STALE_TIME: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    DeviceData,
    DailyTrafficUsage,
    ServersList,
    InterfacesList,
    IpPoolsList,
    PeersList,
    PeerConfig,
    PeerQrCode,
    PeerShare,
    UserConfig,
    UserQrCode,
    UserDetails,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceData => "device_data",
            Self::DailyTrafficUsage => "daily_traffic_usage",
            Self::ServersList => "servers_list",
            Self::InterfacesList => "interfaces_list",
            Self::IpPoolsList => "ip_pools_list",
            Self::PeersList => "peers_list",
            Self::PeerConfig => "peer_config",
            Self::PeerQrCode => "peer_qrcode",
            Self::PeerShare => "peer_share",
            Self::UserConfig => "user_config",
            Self::UserQrCode => "user_qrcode",
            Self::UserDetails => "user_details",
        }
    }
}

/// A cache slot: the resource plus an optional id, uuid or range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub param: Option<String>,
}

impl QueryKey {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            param: None,
        }
    }

    pub fn with(resource: Resource, param: impl fmt::Display) -> Self {
        Self {
            resource,
            param: Some(param.to_string()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(p) => write!(f, "{}/{}", self.resource.as_str(), p),
            None => f.write_str(self.resource.as_str()),
        }
    }
}

/// Every write the panel can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Login,
    UpdateProfile,
    CreateServer,
    UpdateServer,
    UpdateServerStatus,
    DeleteServer,
    CreateInterface,
    UpdateInterface,
    UpdateInterfaceStatus,
    DeleteInterface,
    SyncInterfaces,
    CreateIpPool,
    UpdateIpPool,
    DeleteIpPool,
    CreatePeer,
    UpdatePeer,
    UpdatePeerStatus,
    DeletePeer,
    ResetPeerUsage,
    ResetPeerUsages,
    SyncPeers,
    UpdatePeerShareStatus,
    UpdatePeerShareExpire,
    FetchPeerAllowedAddress,
}

impl Mutation {
    /// Resources whose cached reads are stale once this write succeeds.
    pub fn invalidates(self) -> &'static [Resource] {
        use Resource::*;
        match self {
            Self::Login => &[DeviceData],
            Self::UpdateProfile | Self::FetchPeerAllowedAddress => &[],
            Self::CreateServer
            | Self::UpdateServer
            | Self::UpdateServerStatus
            | Self::DeleteServer => &[ServersList],
            Self::CreateInterface
            | Self::UpdateInterface
            | Self::UpdateInterfaceStatus
            | Self::DeleteInterface
            | Self::SyncInterfaces => &[InterfacesList],
            Self::CreateIpPool | Self::UpdateIpPool | Self::DeleteIpPool => &[IpPoolsList],
            Self::CreatePeer
            | Self::UpdatePeer
            | Self::DeletePeer
            | Self::ResetPeerUsage
            | Self::ResetPeerUsages
            | Self::SyncPeers => &[PeersList],
            Self::UpdatePeerStatus => &[PeersList, DeviceData],
            Self::UpdatePeerShareStatus | Self::UpdatePeerShareExpire => &[PeerShare],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn for_profile(profile: BuildProfile) -> Self {
        match profile {
            BuildProfile::Development => Self::never(),
            BuildProfile::Production => Self {
                max_retries: 3,
                base_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(30),
            },
        }
    }

    /// `failures` counts every failed attempt so far, including the last one.
    pub fn should_retry(&self, failures: u32, err: &ApiError) -> bool {
        failures <= self.max_retries && err.is_retryable()
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Nothing cached yet.
    Initial,
    /// Cached data exists but is stale or invalidated.
    Background,
    /// The user asked for fresh data.
    Refetch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub status: QueryStatus,
    pub fetching: Option<FetchKind>,
    pub failure_count: u32,
    pub error: Option<String>,
    pub updated_at: Option<Instant>,
    pub invalidated: bool,
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        self.fetching == Some(FetchKind::Initial)
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.is_some()
    }

    pub fn is_refetching(&self) -> bool {
        self.fetching == Some(FetchKind::Refetch)
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated || self.updated_at.is_none_or(|at| at.elapsed() >= stale_time)
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Entry {
    value: Option<CachedValue>,
    state: QueryState,
}

pub struct QueryClient {
    entries: DashMap<QueryKey, Entry>,
    stale_time: Duration,
    retry: RetryPolicy,
    events: EventBus,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.entries.len())
            .field("stale_time", &self.stale_time)
            .field("retry", &self.retry)
            .finish()
    }
}

impl QueryClient {
    pub fn new(retry: RetryPolicy, events: EventBus) -> Self {
        Self {
            entries: DashMap::new(),
            stale_time: STALE_TIME,
            retry,
            events,
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn state(&self, key: &QueryKey) -> QueryState {
        self.entries
            .get(key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    /// Cached data for `key`, stale or not.
    pub fn cached<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.entries.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// Serve `key` from cache while fresh, otherwise load it with `fetcher`.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(key, fetcher, false).await
    }

    /// Load `key` from the backend even if the cached copy is fresh.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run(key, fetcher, true).await
    }

    async fn run<T, F, Fut>(&self, key: QueryKey, fetcher: F, force: bool) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        // The map guard must be released before awaiting.
        let kind = {
            let mut entry = self.entries.entry(key.clone()).or_default();
            let cached = entry
                .value
                .clone()
                .and_then(|v| v.downcast::<T>().ok());

            if !force && !entry.state.is_stale(self.stale_time) {
                if let Some(value) = cached {
                    debug!(key = %key, "serving fresh cached data");
                    return Ok(value);
                }
            }

            let kind = match (&cached, force) {
                (None, _) => FetchKind::Initial,
                (Some(_), true) => FetchKind::Refetch,
                (Some(_), false) => FetchKind::Background,
            };
            entry.state.fetching = Some(kind);
            if cached.is_none() {
                entry.state.status = QueryStatus::Pending;
            }
            kind
        };
        debug!(key = %key, ?kind, "fetching");

        let mut failures = 0u32;
        let result = loop {
            match fetcher().await {
                Ok(value) => break Ok(value),
                Err(e) => {
                    failures += 1;
                    if !self.retry.should_retry(failures, &e) {
                        break Err(e);
                    }
                    let delay = self.retry.delay(failures - 1);
                    debug!(key = %key, failures, ?delay, error = %e, "retrying query");
                    tokio::time::sleep(delay).await;
                }
            }
        };

        let mut entry = self.entries.entry(key.clone()).or_default();
        entry.state.fetching = None;
        match result {
            Ok(value) => {
                let value = Arc::new(value);
                entry.value = Some(value.clone() as CachedValue);
                entry.state = QueryState {
                    status: QueryStatus::Success,
                    fetching: None,
                    failure_count: 0,
                    error: None,
                    updated_at: Some(Instant::now()),
                    invalidated: false,
                };
                Ok(value)
            }
            Err(e) => {
                warn!(key = %key, failures, error = %e, "query failed");
                entry.state.status = QueryStatus::Error;
                entry.state.failure_count = failures;
                entry.state.error = Some(e.to_string());
                drop(entry);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Global reaction to a failure the caller is about to see: sign in
    /// again on 401, the forbidden page on 403, the error page on 500.
    pub fn report(&self, err: &ApiError) {
        match err {
            ApiError::Unauthorized => {
                self.events.notify_error("Session expired!");
                self.events.navigate(Route::SignIn, false);
            }
            ApiError::Forbidden => {
                self.events.notify_error("Access denied!");
                self.events.navigate(Route::Forbidden, true);
            }
            ApiError::Server { status: 500, .. } => {
                self.events.notify_error("Internal Server Error!");
                self.events.navigate(Route::ServerError, false);
            }
            _ => {}
        }
    }

    /// Mark every key under `resource` stale. Returns how many cached keys
    /// were affected.
    pub fn invalidate(&self, resource: Resource) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().resource == resource {
                entry.value_mut().state.invalidated = true;
                count += 1;
            }
        }
        debug!(resource = resource.as_str(), keys = count, "invalidated");
        self.events.invalidated(resource);
        count
    }

    /// Run a write once. On success the resources it touches are invalidated;
    /// on failure nothing is invalidated and an error notification goes out.
    pub async fn mutate<T, Fut>(&self, mutation: Mutation, op: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match op.await {
            Ok(value) => {
                let mut seen: Vec<Resource> = Vec::with_capacity(2);
                for &resource in mutation.invalidates() {
                    if !seen.contains(&resource) {
                        seen.push(resource);
                        self.invalidate(resource);
                    }
                }
                debug!(?mutation, invalidated = seen.len(), "mutation succeeded");
                Ok(value)
            }
            Err(e) => {
                warn!(?mutation, error = %e, "mutation failed");
                self.report(&e);
                self.events.notify_error(e.user_message());
                if matches!(e, ApiError::NotModified) {
                    self.events.notify_error("Content not modified!");
                }
                Err(e)
            }
        }
    }
}
