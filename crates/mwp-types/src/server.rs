//! Managed servers (the routers the backend talks to).

use serde::{Deserialize, Serialize};

use crate::validate::{positive_id, required, Validate, ValidationError};

/// Reachability of a managed server as last observed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    /// The backend can reach the server's API.
    Available,
    /// The last connection attempt failed.
    NotAvailable,
}

/// A managed server as returned by `GET /server`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Backend identifier.
    pub id: u64,
    /// Free-form note.
    pub comment: Option<String>,
    /// Display name.
    pub name: String,
    /// Address of the server's REST API.
    pub ip_address: String,
    /// Port of the server's REST API.
    pub api_port: String,
    /// API user, when the backend chooses to echo it.
    #[serde(default)]
    pub username: Option<String>,
    /// Reachability.
    pub status: ServerStatus,
    /// Whether the panel currently manages this server.
    pub is_active: bool,
}

/// Payload for `POST /server`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServerRequest {
    /// Free-form note.
    pub comment: Option<String>,
    /// Display name.
    pub name: String,
    /// Address of the server's REST API.
    pub ip_address: String,
    /// Port of the server's REST API.
    pub api_port: String,
    /// API user.
    pub username: String,
    /// API password. Never returned by the backend.
    pub password: String,
}

impl Validate for CreateServerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, "Name is required")?;
        required("ip_address", &self.ip_address, "IP Address is required")?;
        required("api_port", &self.api_port, "Rest API Port is required")?;
        required("username", &self.username, "Username is required")?;
        required("password", &self.password, "Password is required")
    }
}

/// Payload for `PUT /server/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateServerRequest {
    /// Target server.
    pub id: u64,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Address of the server's REST API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Port of the server's REST API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_port: Option<String>,
    /// API user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// API password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Validate for UpdateServerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("id", self.id)
    }
}

impl From<&Server> for UpdateServerRequest {
    fn from(s: &Server) -> Self {
        Self {
            id: s.id,
            comment: s.comment.clone(),
            name: Some(s.name.clone()),
            ip_address: Some(s.ip_address.clone()),
            api_port: Some(s.api_port.clone()),
            username: s.username.clone(),
            password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn create() -> CreateServerRequest {
        CreateServerRequest {
            comment: None,
            name: "edge-1".into(),
            ip_address: "192.0.2.10".into(),
            api_port: "443".into(),
            username: "admin".into(),
            password: "secret".into(),
        }
    }

    #[test]
    fn parses_server() {
        let json = r#"{"id":1,"comment":null,"name":"edge-1","ip_address":"192.0.2.10",
            "api_port":"443","status":"not_available","is_active":true}"#;
        let server: Server = serde_json::from_str(json).unwrap();
        assert_eq!(server.status, ServerStatus::NotAvailable);
        assert!(server.username.is_none());
    }

    #[test]
    fn complete_create_passes() {
        assert!(create().validate().is_ok());
    }

    #[test_case("name" ; "name")]
    #[test_case("ip_address" ; "ip address")]
    #[test_case("api_port" ; "api port")]
    #[test_case("username" ; "username")]
    #[test_case("password" ; "password")]
    fn create_requires(field: &str) {
        let mut req = create();
        match field {
            "name" => req.name.clear(),
            "ip_address" => req.ip_address.clear(),
            "api_port" => req.api_port.clear(),
            "username" => req.username.clear(),
            _ => req.password.clear(),
        }
        assert_eq!(req.validate().unwrap_err().field, field);
    }

    #[test]
    fn update_only_needs_id() {
        let req = UpdateServerRequest {
            id: 3,
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 3 }));

        let zero = UpdateServerRequest::default();
        assert!(zero.validate().is_err());
    }
}
