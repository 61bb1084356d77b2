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

//! Typed client for the panel REST API.
//!
//! One method per backend endpoint, each issuing exactly one HTTP request.
//! Every response passes through [`ApiClient`]'s interceptor before it is
//! decoded: non-2xx statuses become [`ApiError`]s and a 401 drops the stored
//! token. Toasts and redirects are left to the query layer, which reports
//! each failure once after its retries.

mod auth;
mod dashboard;
mod interfaces;
mod ip_pools;
mod peers;
mod servers;
mod user;

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mwp_types::{ApiResponse, ErrorBody, Validate, ValidationError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("unexpected response from {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unauthorized (401), session expired")]
    Unauthorized,

    #[error("forbidden (403)")]
    Forbidden,

    #[error("not modified (304)")]
    NotModified,

    #[error("request failed with status code {status}")]
    Server { status: u16, message: Option<String> },

    #[error("request failed with status code {status}")]
    Status { status: u16, message: Option<String> },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotModified => Some(304),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Validation(_) | Self::Schema { .. } => None,
        }
    }

    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }

    /// Whether the query layer may try the same read again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::Validation(_) | Self::Schema { .. }
        )
    }

    /// The reason the backend gave in the error body, if it gave one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } | Self::Status { message, .. } => message.as_deref(),
            Self::Validation(e) => Some(&e.message),
            _ => None,
        }
    }

    /// Text for an error toast: the server reason, else the error itself.
    pub fn user_message(&self) -> String {
        match self.server_message() {
            Some(m) => m.to_string(),
            None => {
                let text = self.to_string();
                if text.is_empty() {
                    "Something went wrong!".to_string()
                } else {
                    text
                }
            }
        }
    }
}

/// A QR code image as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl QrImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "sending API request");
        let builder = self.http.request(method, url);
        match self.session.access_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let resp = builder.send().await?;
        self.intercept(resp, path).await
    }

    /// Map non-2xx responses to errors. A 401 also clears the session.
    async fn intercept(&self, resp: Response, path: &str) -> Result<Response, ApiError> {
        let status = resp.status().as_u16();
        debug!(status, path, "received API response");

        match status {
            200..=299 => Ok(resp),
            304 => {
                debug!(path, "content not modified");
                Err(ApiError::NotModified)
            }
            401 => {
                warn!(path, "API returned 401, clearing session");
                if let Err(e) = self.session.reset().await {
                    error!(error = %e, "failed to clear session after 401");
                }
                Err(ApiError::Unauthorized)
            }
            403 => {
                warn!(path, "API returned 403");
                Err(ApiError::Forbidden)
            }
            _ => {
                let body = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.reason().map(str::to_string));
                warn!(status, path, body = %body, "API returned unexpected status");

                if status >= 500 {
                    Err(ApiError::Server { status, message })
                } else {
                    Err(ApiError::Status { status, message })
                }
            }
        }
    }

    async fn decode<T: DeserializeOwned>(resp: Response, path: &str) -> Result<T, ApiError> {
        let body = resp.text().await?;
        match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => Ok(envelope.data),
            Err(source) => {
                warn!(path, error = %source, "response did not match the expected schema");
                Err(ApiError::Schema {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    pub(crate) async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path).await, path).await?;
        Self::decode(resp, path).await
    }

    /// List endpoints answer `data: null` when empty.
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let list: Option<Vec<T>> = self.get_data(path).await?;
        Ok(list.unwrap_or_default())
    }

    pub(crate) async fn send_data<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path).await.json(body);
        let resp = self.send(builder, path).await?;
        Self::decode(resp, path).await
    }

    /// Validate, then send. Nothing reaches the network when validation fails.
    pub(crate) async fn send_validated<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned,
    {
        if let Err(e) = body.validate() {
            debug!(path, field = e.field, "request rejected before sending");
            return Err(e.into());
        }
        self.send_data(method, path, body).await
    }

    /// Issue a write whose response body is ignored.
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.send(self.request(method, path).await, path).await?;
        Ok(())
    }

    pub(crate) async fn send_json_empty<B>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, path).await.json(body);
        self.send(builder, path).await?;
        Ok(())
    }

    pub(crate) async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        let resp = self.send(self.request(Method::GET, path).await, path).await?;
        Ok(resp.text().await?)
    }

    pub(crate) async fn get_image(&self, path: &str) -> Result<QrImage, ApiError> {
        let resp = self.send(self.request(Method::GET, path).await, path).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        debug!(path, size = bytes.len(), %content_type, "received image");
        Ok(QrImage { content_type, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ApiError::Unauthorized, false ; "unauthorized")]
    #[test_case(ApiError::Forbidden, false ; "forbidden")]
    #[test_case(ApiError::Validation(ValidationError::new("name", "required")), false ; "validation")]
    #[test_case(ApiError::Server { status: 502, message: None }, true ; "bad gateway")]
    #[test_case(ApiError::Status { status: 404, message: None }, true ; "not found")]
    fn retryable(err: ApiError, expected: bool) {
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn user_message_prefers_server_reason() {
        let err = ApiError::Status {
            status: 409,
            message: Some("Peer name already exists".into()),
        };
        assert_eq!(err.user_message(), "Peer name already exists");
        assert_eq!(err.status(), Some(409));

        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message(), "request failed with status code 500");
    }

    #[test]
    fn qr_data_url() {
        let qr = QrImage {
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        assert_eq!(qr.to_data_url(), "data:image/png;base64,iVBORw==");
    }
}
