//! Worker threads whose failures are always reported.

use std::cell::Cell;
use std::error::Error;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::fault::{BackgroundFaultReporter, PanicFault};

const WORKER_TARGET: &str = "courier_runtime::worker";

/// Label used for threads spawned without a name.
const UNNAMED_THREAD: &str = "<unnamed>";

thread_local! {
    /// Set on threads started by [`spawn_reported`], which report their own
    /// panics with the payload attached.
    static REPORTED_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Spawns a named worker thread.
///
/// An `Err` returned by `job`, or a panic inside it, is handed to `reporter`
/// and the thread then ends normally; nothing is rethrown to the joiner.
///
/// # Errors
///
/// Returns the OS error when the thread cannot be spawned.
pub fn spawn_reported<F, E>(
    label: impl Into<String>,
    reporter: Arc<BackgroundFaultReporter>,
    job: F,
) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: Error + Send + 'static,
{
    let thread_label: String = label.into();
    let thread_name = thread_label.clone();
    thread::Builder::new().name(thread_name).spawn(move || {
        REPORTED_WORKER.with(|flag| flag.set(true));
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => debug!(target: WORKER_TARGET, thread = %thread_label, "worker finished"),
            Ok(Err(fault)) => reporter.report(&thread_label, &fault),
            Err(payload) => {
                reporter.report(&thread_label, &PanicFault::from_payload(payload.as_ref()));
            }
        }
    })
}

/// Installs a process-wide panic hook reporting panics on background threads.
///
/// Panics on the `main` thread and on threads from [`spawn_reported`] are left
/// to their usual handling. The previously installed hook still runs for
/// every panic.
pub fn install_panic_hook(reporter: Arc<BackgroundFaultReporter>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let current = thread::current();
        let label = current.name().unwrap_or(UNNAMED_THREAD);
        let managed = REPORTED_WORKER.with(Cell::get);
        if label != "main" && !managed {
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|text| (*text).to_owned())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| info.to_string());
            reporter.report(label, &PanicFault::new(message));
        }
        previous(info);
    }));
}

#[cfg(test)]
mod tests;
