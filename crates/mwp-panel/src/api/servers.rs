use mwp_types::server::{CreateServerRequest, Server, UpdateServerRequest};
use reqwest::Method;
use tracing::{debug, info};

use super::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_servers_list(&self) -> Result<Vec<Server>, ApiError> {
        let servers: Vec<Server> = self.get_list("/server").await?;
        debug!(count = servers.len(), "fetched servers");
        Ok(servers)
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name, ip_address = %req.ip_address))]
    pub async fn create_server(&self, req: &CreateServerRequest) -> Result<Server, ApiError> {
        let server: Server = self.send_validated(Method::POST, "/server", req).await?;
        info!(id = server.id, "server created");
        Ok(server)
    }

    #[tracing::instrument(skip(self, req), fields(id = req.id))]
    pub async fn update_server(&self, req: &UpdateServerRequest) -> Result<Server, ApiError> {
        self.send_validated(Method::PUT, &format!("/server/{}", req.id), req).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_server_status(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &format!("/server/{id}/status")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_server(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/server/{id}")).await?;
        info!(id, "server deleted");
        Ok(())
    }
}
