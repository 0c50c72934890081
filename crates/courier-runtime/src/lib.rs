//! Process-level runtime support for courier clients.
//!
//! * [`BackgroundFaultReporter`] absorbs faults from worker threads: it logs
//!   the thread label and the fault, then returns normally.
//! * [`spawn_reported`] and [`install_panic_hook`] route worker failures to a
//!   reporter so they are observed rather than lost.
//! * [`telemetry::initialise`] installs the global `tracing` subscriber.

pub mod error;
pub mod fault;
pub mod telemetry;
pub mod worker;

pub use self::error::PreconditionError;
pub use self::fault::{BackgroundFaultReporter, FaultSink, PanicFault, TracingFaultSink};
pub use self::worker::{install_panic_hook, spawn_reported};
