//! Address pools peers are allocated from.

use serde::{Deserialize, Serialize};

use crate::validate::{ipv4_range, positive_id, required, Validate, ValidationError};

/// An address pool as returned by `GET /ip-pool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpPool {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// First address of the range, `/32` notation.
    pub start_ip: String,
    /// Last address of the range, `/32` notation.
    pub end_ip: String,
    /// Size of the range.
    pub total_ip: u64,
    /// Addresses handed out.
    pub used_ip: u64,
    /// Addresses still free.
    pub remaining_ip: u64,
    /// Most recently allocated address.
    #[serde(default)]
    pub last_used_ip: Option<String>,
}

impl IpPool {
    /// Whether the backend's accounting adds up (`used + remaining == total`).
    pub fn is_consistent(&self) -> bool {
        self.used_ip.checked_add(self.remaining_ip) == Some(self.total_ip)
    }
}

/// Payload for `POST /ip-pool`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateIpPoolRequest {
    /// Display name.
    pub name: String,
    /// Interface the pool serves.
    pub interface_id: u64,
    /// First address.
    pub start_ip: String,
    /// Last address.
    pub end_ip: String,
}

impl Validate for CreateIpPoolRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, "Name is required")?;
        if self.interface_id < 1 {
            return Err(ValidationError::new("interface_id", "Interface ID is required"));
        }
        required("start_ip", &self.start_ip, "Start IP is required")?;
        required("end_ip", &self.end_ip, "End IP is required")?;
        ipv4_range(&self.start_ip, &self.end_ip)
    }
}

/// Payload for `PUT /ip-pool/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateIpPoolRequest {
    /// Target pool.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// First address.
    pub start_ip: String,
    /// Last address.
    pub end_ip: String,
}

impl Validate for UpdateIpPoolRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive_id("id", self.id)?;
        required("name", &self.name, "Name is required")?;
        required("start_ip", &self.start_ip, "Start IP is required")?;
        required("end_ip", &self.end_ip, "End IP is required")?;
        ipv4_range(&self.start_ip, &self.end_ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn pool(total: u64, used: u64, remaining: u64) -> IpPool {
        IpPool {
            id: 1,
            name: "office".into(),
            start_ip: "10.0.0.2/32".into(),
            end_ip: "10.0.0.254/32".into(),
            total_ip: total,
            used_ip: used,
            remaining_ip: remaining,
            last_used_ip: None,
        }
    }

    #[test_case(253, 3, 250, true ; "balanced")]
    #[test_case(253, 3, 251, false ; "overcounted")]
    #[test_case(0, 0, 0, true ; "empty")]
    #[test_case(u64::MAX, u64::MAX, 1, false ; "overflow")]
    fn consistency(total: u64, used: u64, remaining: u64, expected: bool) {
        assert_eq!(pool(total, used, remaining).is_consistent(), expected);
    }

    #[test]
    fn last_used_ip_may_be_missing() {
        let json = r#"{"id":1,"name":"office","start_ip":"10.0.0.2/32","end_ip":"10.0.0.254/32",
            "total_ip":253,"used_ip":0,"remaining_ip":253}"#;
        let pool: IpPool = serde_json::from_str(json).unwrap();
        assert!(pool.last_used_ip.is_none());
    }

    #[test]
    fn create_rejects_missing_interface_and_inverted_range() {
        let mut req = CreateIpPoolRequest {
            name: "office".into(),
            interface_id: 0,
            start_ip: "10.0.0.2/32".into(),
            end_ip: "10.0.0.255/32".into(),
        };
        assert_eq!(req.validate().unwrap_err().field, "interface_id");

        req.interface_id = 4;
        assert!(req.validate().is_ok());

        req.end_ip = "10.0.0.1/32".into();
        assert_eq!(req.validate().unwrap_err().field, "end_ip");
    }
}
