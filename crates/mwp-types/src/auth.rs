//! Administrator authentication.

use serde::{Deserialize, Serialize};

use crate::validate::{Validate, ValidationError};

/// Minimum password length accepted by the sign-in form.
pub const MIN_PASSWORD_LEN: usize = 7;

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Administrator name.
    pub username: String,
    /// Administrator password.
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::new("username", "Please enter your username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "Please enter your password"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::new(
                "password",
                "Password must be at least 7 characters long",
            ));
        }
        Ok(())
    }
}

/// Tokens issued by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token attached to every request.
    pub access_token: String,
    /// Refresh token. Issued but not used by the panel.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Payload for `PUT /auth/profile`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New administrator name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New administrator password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_none() && self.password.is_none() {
            return Err(ValidationError::new("username", "Nothing to update"));
        }
        if self.username.as_deref().is_some_and(str::is_empty) {
            return Err(ValidationError::new("username", "Please enter your username"));
        }
        if self
            .password
            .as_deref()
            .is_some_and(|p| p.chars().count() < MIN_PASSWORD_LEN)
        {
            return Err(ValidationError::new(
                "password",
                "Password must be at least 7 characters long",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", "longenough", Some("username") ; "empty username")]
    #[test_case("admin", "", Some("password") ; "empty password")]
    #[test_case("admin", "short", Some("password") ; "short password")]
    #[test_case("admin", "1234567", None ; "seven characters")]
    fn login_validation(username: &str, password: &str, failing: Option<&str>) {
        let req = LoginRequest {
            username: username.into(),
            password: password.into(),
        };
        assert_eq!(req.validate().err().map(|e| e.field), failing);
    }

    #[test]
    fn login_messages_match_form() {
        let req = LoginRequest {
            username: "admin".into(),
            password: String::new(),
        };
        assert_eq!(req.validate().unwrap_err().message, "Please enter your password");
    }

    #[test]
    fn profile_needs_something() {
        assert!(UpdateProfileRequest::default().validate().is_err());
        let req = UpdateProfileRequest {
            username: Some("root".into()),
            password: None,
        };
        assert!(req.validate().is_ok());
        assert_eq!(serde_json::to_value(&req).unwrap(), serde_json::json!({"username": "root"}));
    }
}
