//! WireGuard interfaces on a managed server.

use serde::{Deserialize, Serialize};

use crate::validate::{positive_id, required, Validate, ValidationError};

/// A WireGuard interface as returned by `GET /interface`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// Backend identifier.
    pub id: u64,
    /// Identifier of the interface on the device itself (e.g. `*1`).
    pub interface_id: String,
    /// Whether the interface is administratively disabled.
    pub disabled: bool,
    /// Free-form note.
    pub comment: Option<String>,
    /// Interface name (e.g. `wg0`).
    pub name: String,
    /// UDP listen port.
    pub listen_port: String,
    /// MTU.
    pub mtu: String,
    /// Whether the device reports the interface as running.
    pub is_running: bool,
}

/// Payload for `POST /interface`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateInterfaceRequest {
    /// Free-form note.
    pub comment: Option<String>,
    /// Interface name.
    pub name: String,
    /// UDP listen port.
    pub listen_port: String,
}

impl Validate for CreateInterfaceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, "Name is required")?;
        required("listen_port", &self.listen_port, "Listen Port is required")
    }
}

/// Payload for `PUT /interface/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateInterfaceRequest {
    /// Target interface.
    pub id: u64,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Interface name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// UDP listen port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<String>,
    /// MTU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<String>,
}

impl Validate for UpdateInterfaceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("id", self.id)
    }
}

impl From<&Interface> for UpdateInterfaceRequest {
    fn from(i: &Interface) -> Self {
        Self {
            id: i.id,
            disabled: Some(i.disabled),
            comment: i.comment.clone(),
            name: Some(i.name.clone()),
            listen_port: Some(i.listen_port.clone()),
            mtu: Some(i.mtu.clone()),
        }
    }
}
