//! Public share endpoints, reachable without signing in.

use mwp_types::peer::PeerStats;

use super::{ApiClient, ApiError, QrImage};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn fetch_user_qrcode(&self, uuid: &str) -> Result<QrImage, ApiError> {
        self.get_image(&format!("/user/{uuid}/qrcode")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_user_config(&self, uuid: &str) -> Result<String, ApiError> {
        self.get_text(&format!("/user/{uuid}/config")).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch_user_details(&self, uuid: &str) -> Result<PeerStats, ApiError> {
        self.get_data(&format!("/user/{uuid}/details")).await
    }
}
