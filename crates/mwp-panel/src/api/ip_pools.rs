use mwp_types::ip_pool::{CreateIpPoolRequest, IpPool, UpdateIpPoolRequest};
use reqwest::Method;
use tracing::{debug, info, warn};

use super::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_ip_pools_list(&self) -> Result<Vec<IpPool>, ApiError> {
        let pools: Vec<IpPool> = self.get_list("/ip-pool").await?;
        for pool in pools.iter().filter(|p| !p.is_consistent()) {
            warn!(
                id = pool.id,
                total = pool.total_ip,
                used = pool.used_ip,
                remaining = pool.remaining_ip,
                "pool counters do not add up"
            );
        }
        debug!(count = pools.len(), "fetched ip pools");
        Ok(pools)
    }

    #[tracing::instrument(skip(self, req), fields(name = %req.name, start_ip = %req.start_ip, end_ip = %req.end_ip))]
    pub async fn create_ip_pool(&self, req: &CreateIpPoolRequest) -> Result<IpPool, ApiError> {
        let pool: IpPool = self.send_validated(Method::POST, "/ip-pool", req).await?;
        info!(id = pool.id, total = pool.total_ip, "ip pool created");
        Ok(pool)
    }

    #[tracing::instrument(skip(self, req), fields(id = req.id))]
    pub async fn update_ip_pool(&self, req: &UpdateIpPoolRequest) -> Result<IpPool, ApiError> {
        self.send_validated(Method::PUT, &format!("/ip-pool/{}", req.id), req).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_ip_pool(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/ip-pool/{id}")).await?;
        info!(id, "ip pool deleted");
        Ok(())
    }
}
