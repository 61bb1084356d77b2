//! mwp-types: transport records and request schemas for the mwp panel API.
//!
//! Every JSON response from the panel backend is wrapped in an
//! [`ApiResponse`] envelope. Request payloads implement [`Validate`] so the
//! client can fail fast before anything reaches the network; the backend
//! remains the authority on every rule checked here.

#![warn(missing_docs)]

pub mod auth;
pub mod dashboard;
pub mod envelope;
pub mod interface;
pub mod ip_pool;
pub mod peer;
pub mod server;
pub mod validate;

pub use envelope::{ApiResponse, ApiStatus, ErrorBody};
pub use validate::{Validate, ValidationError};
