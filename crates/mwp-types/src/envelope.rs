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

//! The `{ statusCode, status, data }` envelope shared by all JSON endpoints.

use serde::{Deserialize, Serialize};

/// Outcome flag carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    /// The request was handled.
    Success,
    /// The backend rejected or failed the request.
    Error,
}

/// Successful response envelope wrapping a payload of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status echoed by the backend.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Outcome flag.
    pub status: ApiStatus,
    /// Payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a `200 success` envelope.
    pub fn success(data: T) -> Self {
        Self {
            status_code: 200,
            status: ApiStatus::Success,
            data,
        }
    }
}

/// Body of a failed request. Every field is optional since proxies and
/// framework error pages do not always follow the envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status echoed by the backend.
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<u16>,
    /// Outcome flag.
    #[serde(default)]
    pub status: Option<ApiStatus>,
    /// Human-readable reason.
    #[serde(default)]
    pub message: Option<String>,
    /// Secondary reason used by some handlers instead of `message`.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// The most specific reason the body carries, if any.
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.detail.as_deref().filter(|d| !d.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_envelope() {
        let body = r#"{"statusCode":200,"status":"success","data":[1,2,3]}"#;
        let parsed: ApiResponse<Vec<u32>> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, ApiStatus::Success);
        assert_eq!(parsed.data, vec![1, 2, 3]);
    }

    #[test]
    fn null_list_payload_is_none() {
        let body = r#"{"statusCode":200,"status":"success","data":null}"#;
        let parsed: ApiResponse<Option<Vec<u32>>> = serde_json::from_str(body).unwrap();
        assert!(parsed.data.is_none());
    }

    #[test]
    fn rejects_unknown_status() {
        let body = r#"{"statusCode":200,"status":"ok","data":1}"#;
        assert!(serde_json::from_str::<ApiResponse<u32>>(body).is_err());
    }

    #[test]
    fn rejects_missing_status_code() {
        let body = r#"{"status":"success","data":1}"#;
        assert!(serde_json::from_str::<ApiResponse<u32>>(body).is_err());
    }

    #[test]
    fn error_reason_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"boom","detail":"inner"}"#).unwrap();
        assert_eq!(body.reason(), Some("boom"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail":"inner"}"#).unwrap();
        assert_eq!(body.reason(), Some("inner"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.reason(), None);
    }
}
