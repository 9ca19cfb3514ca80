//! Publish/subscribe channel for auth-state transitions. One broadcaster is
//! created per process (or per test) and handed to every session; a session's
//! subscription ends when its [`Subscription`] is dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;
use uuid::Uuid;

/// Name the transition is published under.
pub const AUTH_STATE_CHANGED: &str = "auth-state-changed";

/// Buffered events per subscriber before it lags.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    pub is_logged_in: bool,
    pub is_admin: bool,
}

impl AuthEvent {
    #[must_use]
    pub const fn logged_out() -> Self {
        Self {
            is_logged_in: false,
            is_admin: false,
        }
    }
}

/// An event together with the session that published it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub origin: Uuid,
    pub event: AuthEvent,
}

#[derive(Clone, Debug)]
pub struct AuthBroadcaster {
    tx: broadcast::Sender<Envelope>,
}

impl AuthBroadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publishes `event` to every live subscriber and returns how many received it.
    pub fn publish(&self, origin: Uuid, event: AuthEvent) -> usize {
        let delivered = self.tx.send(Envelope { origin, event }).unwrap_or(0);
        debug!(
            name = AUTH_STATE_CHANGED,
            %origin,
            is_logged_in = event.is_logged_in,
            is_admin = event.is_admin,
            delivered,
            "auth event published"
        );
        delivered
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AuthBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of waiting on a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Received {
    Event(Envelope),
    /// Events were dropped because this subscriber fell behind.
    Lagged(u64),
    Closed,
}

#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Received {
        match self.rx.recv().await {
            Ok(envelope) => Received::Event(envelope),
            Err(RecvError::Lagged(skipped)) => Received::Lagged(skipped),
            Err(RecvError::Closed) => Received::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_camel_case() -> Result<(), serde_json::Error> {
        let event = AuthEvent {
            is_logged_in: true,
            is_admin: false,
        };
        assert_eq!(
            serde_json::to_value(event)?,
            serde_json::json!({ "isLoggedIn": true, "isAdmin": false })
        );
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let broadcaster = AuthBroadcaster::new();
        assert_eq!(broadcaster.publish(Uuid::new_v4(), AuthEvent::logged_out()), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events_until_dropped() {
        let broadcaster = AuthBroadcaster::new();
        let origin = Uuid::new_v4();
        let mut first = broadcaster.subscribe();
        let second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(second);
        assert_eq!(broadcaster.subscriber_count(), 1);

        let event = AuthEvent {
            is_logged_in: true,
            is_admin: true,
        };
        assert_eq!(broadcaster.publish(origin, event), 1);
        assert_eq!(first.recv().await, Received::Event(Envelope { origin, event }));
    }

    #[tokio::test]
    async fn slow_subscribers_observe_lag() {
        let broadcaster = AuthBroadcaster::new();
        let mut sub = broadcaster.subscribe();
        let origin = Uuid::new_v4();
        for _ in 0..(CHANNEL_CAPACITY + 3) {
            broadcaster.publish(origin, AuthEvent::logged_out());
        }
        assert_eq!(sub.recv().await, Received::Lagged(3));
    }
}
