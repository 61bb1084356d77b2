use mwp_types::interface::{CreateInterfaceRequest, Interface, UpdateInterfaceRequest};
use reqwest::Method;
use tracing::{debug, info};

use super::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_interfaces_list(&self) -> Result<Vec<Interface>, ApiError> {
        let interfaces: Vec<Interface> = self.get_list("/interface").await?;
        debug!(count = interfaces.len(), "fetched interfaces");
        Ok(interfaces)
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name, listen_port = %req.listen_port))]
    pub async fn create_interface(&self, req: &CreateInterfaceRequest) -> Result<Interface, ApiError> {
        let iface: Interface = self.send_validated(Method::POST, "/interface", req).await?;
        info!(id = iface.id, interface_id = %iface.interface_id, "interface created");
        Ok(iface)
    }

    #[tracing::instrument(skip(self, req), fields(id = req.id))]
    pub async fn update_interface(&self, req: &UpdateInterfaceRequest) -> Result<Interface, ApiError> {
        self.send_validated(Method::PUT, &format!("/interface/{}", req.id), req).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_interface_status(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::PATCH, &format!("/interface/{id}/status")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_interface(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/interface/{id}")).await?;
        info!(id, "interface deleted");
        Ok(())
    }

    /// Ask the backend to reconcile its interface records with the router.
    #[tracing::instrument(skip(self))]
    pub async fn sync_interfaces(&self) -> Result<(), ApiError> {
        self.send_empty(Method::POST, "/sync/interfaces").await?;
        info!("interfaces synced");
        Ok(())
    }
}
