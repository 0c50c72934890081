//! In-process broadcast with per-session filtering.
//!
//! Each session subscribes once with a callback. [`SessionEventBus::publish`]
//! evaluates the filter per subscribed session and invokes callbacks outside
//! the subscription lock, so a callback may publish or unsubscribe without
//! deadlocking.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, trace};

use crate::filter::EventSessionFilter;
use crate::lifecycle::ClientSessionListener;

const BUS_TARGET: &str = "courier_events::bus";

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A session may hold only one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session '{0}' is already subscribed")]
pub struct SubscribeError(pub String);

/// Delivers events to subscribed sessions.
pub struct SessionEventBus<E> {
    subscribers: RwLock<BTreeMap<String, Callback<E>>>,
}

impl<E> Default for SessionEventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E> std::fmt::Debug for SessionEventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEventBus")
            .field("subscribers", &self.subscribed_sessions())
            .finish()
    }
}

impl<E> SessionEventBus<E> {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `session_id` with `callback`.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError`] when the session already has a subscription.
    pub fn subscribe<F>(
        &self,
        session_id: impl Into<String>,
        callback: F,
    ) -> Result<(), SubscribeError>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let session: String = session_id.into();
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if subscribers.contains_key(&session) {
            return Err(SubscribeError(session));
        }
        trace!(target: BUS_TARGET, %session, "subscribed");
        subscribers.insert(session, Arc::new(callback));
        Ok(())
    }

    /// Removes the subscription of `session_id`; returns whether one existed.
    pub fn unsubscribe(&self, session_id: &str) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    /// Subscribed session ids in ascending order.
    #[must_use]
    pub fn subscribed_sessions(&self) -> Vec<String> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Delivers `event` to every subscribed session `filter` accepts, or to
    /// all of them when there is no filter. Returns the delivery count.
    pub fn publish(&self, event: &E, filter: Option<&dyn EventSessionFilter>) -> usize {
        let recipients: Vec<(String, Callback<E>)> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(session, _)| filter.is_none_or(|f| f.should_handle_event(session)))
            .map(|(session, callback)| (session.clone(), Arc::clone(callback)))
            .collect();

        for (session, callback) in &recipients {
            trace!(target: BUS_TARGET, session = %session, "delivering event");
            callback(event);
        }
        debug!(
            target: BUS_TARGET,
            delivered = recipients.len(),
            filtered = filter.is_some(),
            "event published"
        );
        recipients.len()
    }
}

impl<E: 'static> ClientSessionListener for SessionEventBus<E> {
    fn session_created(&self, _session_id: &str) {}

    fn session_destroyed(&self, session_id: &str) {
        self.unsubscribe(session_id);
    }
}
