//! Live client sessions and their observers.
//!
//! The session set is owned here; listeners are told about every creation
//! and destruction in registration order. Listeners are fixed once the
//! lifecycle is shared.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::filter::ListEventSessionFilter;

const LIFECYCLE_TARGET: &str = "courier_events::lifecycle";

/// Observes session creation and destruction.
#[cfg_attr(test, mockall::automock)]
pub trait ClientSessionListener: Send + Sync {
    /// Called after `session_id` became live.
    fn session_created(&self, session_id: &str);

    /// Called after `session_id` ended.
    fn session_destroyed(&self, session_id: &str);
}

/// Invalid lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Session ids must contain a non-whitespace character.
    #[error("session id must not be blank")]
    BlankSessionId,
    /// The session is already live.
    #[error("session '{0}' already exists")]
    DuplicateSession(String),
    /// The session is not live.
    #[error("session '{0}' does not exist")]
    UnknownSession(String),
}

/// Tracks live sessions and notifies listeners.
#[derive(Default)]
pub struct ClientSessionLifecycle {
    sessions: RwLock<BTreeSet<String>>,
    listeners: Vec<Arc<dyn ClientSessionListener>>,
}

impl std::fmt::Debug for ClientSessionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSessionLifecycle")
            .field("sessions", &self.live_sessions())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ClientSessionLifecycle {
    /// Creates a lifecycle with no sessions or listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn ClientSessionListener>) {
        self.listeners.push(listener);
    }

    /// Marks `session_id` live and notifies listeners.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::BlankSessionId`] or
    /// [`LifecycleError::DuplicateSession`]; listeners are not notified then.
    pub fn create_session(&self, session_id: &str) -> Result<(), LifecycleError> {
        if session_id.trim().is_empty() {
            return Err(LifecycleError::BlankSessionId);
        }
        let inserted = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.to_owned());
        if !inserted {
            return Err(LifecycleError::DuplicateSession(session_id.to_owned()));
        }
        debug!(target: LIFECYCLE_TARGET, session = session_id, "session created");
        for listener in &self.listeners {
            listener.session_created(session_id);
        }
        Ok(())
    }

    /// Ends `session_id` and notifies listeners.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownSession`] when the session is not live.
    pub fn destroy_session(&self, session_id: &str) -> Result<(), LifecycleError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        if !removed {
            return Err(LifecycleError::UnknownSession(session_id.to_owned()));
        }
        debug!(target: LIFECYCLE_TARGET, session = session_id, "session destroyed");
        for listener in &self.listeners {
            listener.session_destroyed(session_id);
        }
        Ok(())
    }

    /// Returns `true` when `session_id` is live.
    #[must_use]
    pub fn is_live(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(session_id)
    }

    /// Live session ids in ascending order.
    #[must_use]
    pub fn live_sessions(&self) -> Vec<String> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Filter accepting exactly the sessions live right now.
    #[must_use]
    pub fn live_filter(&self) -> ListEventSessionFilter {
        ListEventSessionFilter::new(self.live_sessions())
    }
}
