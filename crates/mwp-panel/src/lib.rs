//! mwp-panel: client for the WireGuard management panel API.
//!
//! [`Panel`] is the entry point. It owns an [`api::ApiClient`] for the REST
//! endpoints, a [`query::QueryClient`] that caches reads and invalidates
//! them after writes, and the [`session::SessionStore`] holding the bearer
//! token. User-facing side effects (toasts, redirects) are published as
//! [`events::UiEvent`]s instead of being acted on directly.

pub mod api;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod display;
pub mod events;
pub mod forms;
pub mod panel;
pub mod query;
pub mod session;

pub use panel::{Panel, PanelError};
