//! Background fault reporting.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use crate::error::PreconditionError;

pub(crate) const FAULT_TARGET: &str = "courier_runtime::fault";

/// Logging collaborator that records one entry per reported fault.
#[cfg_attr(test, mockall::automock)]
pub trait FaultSink: Send + Sync {
    /// Records `fault` raised on the thread or task called `label`.
    fn record(&self, label: &str, fault: &(dyn Error + 'static));
}

/// Writes faults as `tracing` error events, including the source chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn record(&self, label: &str, fault: &(dyn Error + 'static)) {
        let causes = std::iter::successors(fault.source(), |&cause| cause.source())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ");
        error!(
            target: FAULT_TARGET,
            thread = label,
            fault = %fault,
            causes = %causes,
            "uncaught fault in background worker"
        );
    }
}

/// A worker panicked; carries the panic message when it was a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker panicked: {message}")]
pub struct PanicFault {
    message: String,
}

impl PanicFault {
    /// Wraps a panic message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts the message from a panic payload.
    #[must_use]
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self { message }
    }

    /// The panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Absorbs faults from background workers.
///
/// Reporting never fails and never panics once the arguments are present.
#[derive(Clone)]
pub struct BackgroundFaultReporter {
    sink: Arc<dyn FaultSink>,
}

impl fmt::Debug for BackgroundFaultReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundFaultReporter").finish_non_exhaustive()
    }
}

impl Default for BackgroundFaultReporter {
    fn default() -> Self {
        Self::new(Arc::new(TracingFaultSink))
    }
}

impl BackgroundFaultReporter {
    /// Creates a reporter writing to `sink`.
    #[must_use]
    pub const fn new(sink: Arc<dyn FaultSink>) -> Self {
        Self { sink }
    }

    /// Records an uncaught fault.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError`] when either argument is absent; nothing
    /// is recorded in that case.
    pub fn on_uncaught(
        &self,
        thread_label: Option<&str>,
        fault: Option<&(dyn Error + 'static)>,
    ) -> Result<(), PreconditionError> {
        let label = thread_label.ok_or(PreconditionError::missing("thread_label"))?;
        let cause = fault.ok_or(PreconditionError::missing("fault"))?;
        self.report(label, cause);
        Ok(())
    }

    /// Records a fault whose arguments are known to be present.
    pub fn report(&self, thread_label: &str, fault: &(dyn Error + 'static)) {
        self.sink.record(thread_label, fault);
    }
}
