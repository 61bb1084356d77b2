use std::future::Future;

use mwp_types::interface::Interface;
use mwp_types::ip_pool::IpPool;
use mwp_types::peer::Peer;
use mwp_types::server::Server;

use crate::api::{ApiClient, ApiError};
use crate::query::Mutation;

/// A record that can be removed through a typed-name confirmation.
pub trait Deletable {
    const KIND: &'static str;
    const MUTATION: Mutation;

    fn id(&self) -> u64;
    fn name(&self) -> &str;
    fn delete(api: &ApiClient, id: u64) -> impl Future<Output = Result<(), ApiError>>;
}

impl Deletable for Server {
    const KIND: &'static str = "Server";
    const MUTATION: Mutation = Mutation::DeleteServer;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
        api.delete_server(id).await
    }
}

impl Deletable for Interface {
    const KIND: &'static str = "Interface";
    const MUTATION: Mutation = Mutation::DeleteInterface;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
        api.delete_interface(id).await
    }
}

impl Deletable for IpPool {
    const KIND: &'static str = "Pool";
    const MUTATION: Mutation = Mutation::DeleteIpPool;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
        api.delete_ip_pool(id).await
    }
}

impl Deletable for Peer {
    const KIND: &'static str = "Peer";
    const MUTATION: Mutation = Mutation::DeletePeer;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
        api.delete_peer(id).await
    }
}

/// The "type the name to confirm" guard in front of every delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    entity_type: &'static str,
    name: String,
    typed: String,
}

impl DeleteConfirmation {
    pub fn new(entity_type: &'static str, name: impl Into<String>) -> Self {
        Self {
            entity_type,
            name: name.into(),
            typed: String::new(),
        }
    }

    pub fn for_entity<E: Deletable>(entity: &E) -> Self {
        Self::new(E::KIND, entity.name())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_value(&mut self, value: impl Into<String>) {
        self.typed = value.into();
    }

    /// Case-sensitive match after trimming what the user typed.
    pub fn is_enabled(&self) -> bool {
        self.typed.trim() == self.name
    }

    pub fn success_message(&self) -> String {
        format!("{} {} has been deleted successfully", self.entity_type, self.name)
    }
}
