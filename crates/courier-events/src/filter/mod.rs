//! Per-session delivery predicates.

use std::collections::HashSet;

/// Decides whether an event should reach the session with a given id.
///
/// Filters are pure predicates and are evaluated concurrently from delivery
/// threads.
pub trait EventSessionFilter: Send + Sync {
    /// Returns `true` when the event should be delivered to `session_id`.
    fn should_handle_event(&self, session_id: &str) -> bool;
}

impl<F> EventSessionFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_handle_event(&self, session_id: &str) -> bool {
        self(session_id)
    }
}

/// Accepts exactly the session ids captured at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEventSessionFilter {
    session_ids: HashSet<String>,
}

impl ListEventSessionFilter {
    /// Captures `session_ids`; order and duplicates are irrelevant.
    #[must_use]
    pub fn new<I, S>(session_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            session_ids: session_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of distinct session ids accepted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.session_ids.len()
    }

    /// Returns `true` when no session is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session_ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ListEventSessionFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl EventSessionFilter for ListEventSessionFilter {
    fn should_handle_event(&self, session_id: &str) -> bool {
        self.session_ids.contains(session_id)
    }
}
