use mwp_types::interface::Interface;
use mwp_types::ip_pool::{CreateIpPoolRequest, IpPool, UpdateIpPoolRequest};

use super::FormMode;

pub const HOST_SUFFIX: &str = "/32";

/// Pools are stored as single-host CIDRs. Append `/32` unless present.
pub fn to_host_cidr(ip: &str) -> String {
    let ip = ip.trim();
    if ip.ends_with(HOST_SUFFIX) {
        ip.to_string()
    } else {
        format!("{ip}{HOST_SUFFIX}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpPoolForm {
    pub mode: FormMode,
    pub name: String,
    pub interface_id: Option<u64>,
    pub start_ip: String,
    pub end_ip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IpPoolSubmission {
    Create(CreateIpPoolRequest),
    Update(UpdateIpPoolRequest),
}

impl IpPoolForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            interface_id: None,
            start_ip: String::new(),
            end_ip: String::new(),
        }
    }

    pub fn edit(pool: &IpPool) -> Self {
        Self {
            mode: FormMode::Edit { id: pool.id },
            name: pool.name.clone(),
            interface_id: None,
            start_ip: pool.start_ip.clone(),
            end_ip: pool.end_ip.clone(),
        }
    }

    /// Preselect the first interface for a new pool.
    pub fn apply_defaults(&mut self, interfaces: &[Interface]) {
        if self.mode.is_edit() || self.interface_id.is_some() {
            return;
        }
        if let Some(first) = interfaces.first() {
            self.interface_id = Some(first.id);
        }
    }

    pub fn submission(&self) -> IpPoolSubmission {
        let start_ip = to_host_cidr(&self.start_ip);
        let end_ip = to_host_cidr(&self.end_ip);
        match self.mode {
            FormMode::Create => IpPoolSubmission::Create(CreateIpPoolRequest {
                name: self.name.clone(),
                interface_id: self.interface_id.unwrap_or_default(),
                start_ip,
                end_ip,
            }),
            FormMode::Edit { id } => IpPoolSubmission::Update(UpdateIpPoolRequest {
                id,
                name: self.name.clone(),
                start_ip,
                end_ip,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mwp_types::Validate;
    use test_case::test_case;

    #[test_case("10.0.0.2", "10.0.0.2/32" ; "bare")]
    #[test_case("10.0.0.2/32", "10.0.0.2/32" ; "already suffixed")]
    #[test_case(" 10.0.0.9 ", "10.0.0.9/32" ; "padded")]
    fn host_cidr(input: &str, expected: &str) {
        assert_eq!(to_host_cidr(input), expected);
    }

    fn interface(id: u64, name: &str) -> Interface {
        Interface {
            id,
            interface_id: format!("*{id}"),
            disabled: false,
            comment: None,
            name: name.into(),
            listen_port: "51820".into(),
            mtu: "1420".into(),
            is_running: true,
        }
    }

    #[test]
    fn create_payload_is_normalised() {
        let mut form = IpPoolForm::create();
        form.apply_defaults(&[interface(3, "wg0"), interface(4, "wg1")]);
        form.name = "office".into();
        form.start_ip = "10.0.0.2".into();
        form.end_ip = "10.0.0.255".into();

        let IpPoolSubmission::Create(req) = form.submission() else {
            panic!("expected create payload");
        };
        assert_eq!(req.interface_id, 3);
        assert_eq!(req.start_ip, "10.0.0.2/32");
        assert_eq!(req.end_ip, "10.0.0.255/32");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_without_interface_fails_validation() {
        let mut form = IpPoolForm::create();
        form.apply_defaults(&[]);
        form.name = "office".into();
        form.start_ip = "10.0.0.2".into();
        form.end_ip = "10.0.0.3".into();

        let IpPoolSubmission::Create(req) = form.submission() else {
            panic!("expected create payload");
        };
        assert_eq!(req.validate().unwrap_err().field, "interface_id");
    }

    #[test]
    fn edit_keeps_existing_suffix() {
        let pool = IpPool {
            id: 9,
            name: "office".into(),
            start_ip: "10.0.0.2/32".into(),
            end_ip: "10.0.0.20/32".into(),
            total_ip: 19,
            used_ip: 1,
            remaining_ip: 18,
            last_used_ip: None,
        };
        let mut form = IpPoolForm::edit(&pool);
        form.apply_defaults(&[interface(1, "wg0")]);
        assert_eq!(form.interface_id, None);

        let IpPoolSubmission::Update(req) = form.submission() else {
            panic!("expected update payload");
        };
        assert_eq!(req.id, 9);
        assert_eq!(req.start_ip, "10.0.0.2/32");
        assert_eq!(req.end_ip, "10.0.0.20/32");
    }
}
