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

//! Client-side request validation.

use std::net::Ipv4Addr;

use chrono::NaiveDate;
use ipnetwork::Ipv4Network;
use thiserror::Error;

/// Date format used by every expiry field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A request field failed its schema check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Message suitable for showing next to the field.
    pub message: String,
}

impl ValidationError {
    /// Build an error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A payload that can be checked before it is sent.
pub trait Validate {
    /// Return the first failing field, if any.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn required(
    field: &'static str,
    value: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, message));
    }
    Ok(())
}

pub(crate) fn positive_id(field: &'static str, id: u64) -> Result<(), ValidationError> {
    if id == 0 {
        return Err(ValidationError::new(field, "must be a positive integer"));
    }
    Ok(())
}

/// Parse an IPv4 host written either bare (`10.0.0.2`) or in CIDR
/// notation (`10.0.0.2/32`).
pub(crate) fn ipv4_host(field: &'static str, value: &str) -> Result<Ipv4Addr, ValidationError> {
    value
        .trim()
        .parse::<Ipv4Network>()
        .map(|net| net.ip())
        .map_err(|_| ValidationError::new(field, "Must be a valid IPv4 address"))
}

pub(crate) fn ipv4_range(start: &str, end: &str) -> Result<(), ValidationError> {
    let start = ipv4_host("start_ip", start)?;
    let end = ipv4_host("end_ip", end)?;
    if start > end {
        return Err(ValidationError::new(
            "end_ip",
            "End IP must not be lower than Start IP",
        ));
    }
    Ok(())
}

pub(crate) fn optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() => NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(|_| ())
            .map_err(|_| ValidationError::new(field, "Must be a date formatted as YYYY-MM-DD")),
        _ => Ok(()),
    }
}

pub(crate) fn optional_gigabytes(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() => match v.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
            _ => Err(ValidationError::new(field, "Must be a non-negative number")),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("10.0.0.2", true ; "bare address")]
    #[test_case("10.0.0.2/32", true ; "host cidr")]
    #[test_case(" 10.0.0.2 ", true ; "surrounding whitespace")]
    #[test_case("10.0.0.256", false ; "octet overflow")]
    #[test_case("fd00::1", false ; "ipv6")]
    #[test_case("", false ; "empty")]
    fn parses_ipv4_host(input: &str, ok: bool) {
        assert_eq!(ipv4_host("start_ip", input).is_ok(), ok);
    }

    #[test_case("10.0.0.2", "10.0.0.255", true ; "ascending")]
    #[test_case("10.0.0.9", "10.0.0.9/32", true ; "single address")]
    #[test_case("10.0.0.10", "10.0.0.9", false ; "descending")]
    #[test_case("10.0.1.0", "10.0.0.255", false ; "numeric not lexical")]
    fn checks_range_order(start: &str, end: &str, ok: bool) {
        assert_eq!(ipv4_range(start, end).is_ok(), ok);
    }

    #[test_case(None, true ; "absent")]
    #[test_case(Some(""), true ; "empty")]
    #[test_case(Some("2025-12-31"), true ; "iso date")]
    #[test_case(Some("31/12/2025"), false ; "other format")]
    fn checks_dates(value: Option<&str>, ok: bool) {
        assert_eq!(optional_date("expire_time", value).is_ok(), ok);
    }

    #[test_case(Some("1.5"), true ; "fractional")]
    #[test_case(Some("-1"), false ; "negative")]
    #[test_case(Some("ten"), false ; "not a number")]
    fn checks_gigabytes(value: Option<&str>, ok: bool) {
        assert_eq!(optional_gigabytes("traffic_limit", value).is_ok(), ok);
    }
}
