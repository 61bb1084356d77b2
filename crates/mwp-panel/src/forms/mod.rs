//! Form state that sits between user input and request payloads.

pub mod bandwidth;
pub mod ip_pool;
pub mod peer;

use chrono::NaiveDate;
use mwp_types::ValidationError;
use mwp_types::validate::DATE_FORMAT;

pub use bandwidth::{BandwidthField, BandwidthUnit};
pub use ip_pool::{IpPoolForm, IpPoolSubmission};
pub use peer::{PeerForm, PeerSubmission};

/// Whether a form creates a record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: u64 },
}

impl FormMode {
    pub fn is_edit(self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

/// Traffic limit input in GB. Blank means unlimited.
pub fn traffic_limit_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Parse a date typed as `YYYY-MM-DD`. Blank means the peer never expires.
pub fn expire_time_value(raw: &str) -> Result<Option<String>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::new("expire_time", "Must be a date formatted as YYYY-MM-DD"))?;
    Ok(Some(format_date(date)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
