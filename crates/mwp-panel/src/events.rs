//! Navigation and notification events.
//!
//! The panel never prints or redirects on its own. Anything a browser would
//! show as a toast or a redirect is published on the [`EventBus`] and the
//! front end (the CLI, or a test) decides what to do with it.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::query::Resource;

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Forbidden,
    ServerError,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/sign-in",
            Self::Forbidden => "/403",
            Self::ServerError => "/500",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// `replace` drops the current entry from history instead of pushing.
    Navigate { route: Route, replace: bool },
    Notify(Notification),
    Invalidated(Resource),
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BUS_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    pub fn navigate(&self, route: Route, replace: bool) {
        info!(route = route.path(), replace, "navigating");
        self.publish(UiEvent::Navigate { route, replace });
    }

    pub fn notify_success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notification");
        self.publish(UiEvent::Notify(Notification {
            level: Level::Success,
            message,
            duration: TOAST_DURATION,
        }));
    }

    pub fn notify_error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "error notification");
        self.publish(UiEvent::Notify(Notification {
            level: Level::Error,
            message,
            duration: TOAST_DURATION,
        }));
    }

    pub fn invalidated(&self, resource: Resource) {
        debug!(resource = resource.as_str(), "resource invalidated");
        self.publish(UiEvent::Invalidated(resource));
    }

    fn publish(&self, event: UiEvent) {
        // No subscribers is normal for one-shot commands.
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.notify_error("nobody listening");
        bus.navigate(Route::SignIn, false);
    }

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.navigate(Route::Forbidden, true);
        bus.notify_error("Access denied!");

        assert_eq!(
            rx.recv().await.unwrap(),
            UiEvent::Navigate {
                route: Route::Forbidden,
                replace: true
            }
        );
        match rx.recv().await.unwrap() {
            UiEvent::Notify(n) => {
                assert_eq!(n.level, Level::Error);
                assert_eq!(n.message, "Access denied!");
                assert_eq!(n.duration, TOAST_DURATION);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
