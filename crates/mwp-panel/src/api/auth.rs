use mwp_types::Validate;
use mwp_types::auth::{LoginRequest, LoginResponse, UpdateProfileRequest};
use reqwest::Method;
use tracing::info;

use super::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let resp: LoginResponse = self.send_validated(Method::POST, "/auth/login", req).await?;
        info!(expires_in = resp.expires_in, "signed in");
        Ok(resp)
    }

    #[tracing::instrument(skip(self, req))]
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<(), ApiError> {
        req.validate()?;
        self.send_json_empty(Method::PUT, "/auth/profile", req).await?;
        info!(
            username_changed = req.username.is_some(),
            password_changed = req.password.is_some(),
            "profile updated"
        );
        Ok(())
    }
}
