//! Unit tests for reported workers.

use std::fmt;
use std::sync::Mutex;

use rstest::{fixture, rstest};

use super::*;
use crate::fault::FaultSink;

#[derive(Default)]
struct RecordingSink(Mutex<Vec<(String, String)>>);

impl FaultSink for RecordingSink {
    fn record(&self, label: &str, fault: &(dyn Error + 'static)) {
        self.0
            .lock()
            .expect("sink lock")
            .push((label.to_owned(), fault.to_string()));
    }
}

impl RecordingSink {
    fn entries(&self) -> Vec<(String, String)> {
        self.0.lock().expect("sink lock").clone()
    }
}

#[derive(Debug)]
struct JobFailed;

impl fmt::Display for JobFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue poisoned")
    }
}

impl Error for JobFailed {}

#[fixture]
fn sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::default())
}

fn reporter(sink: &Arc<RecordingSink>) -> Arc<BackgroundFaultReporter> {
    Arc::new(BackgroundFaultReporter::new(Arc::clone(sink) as Arc<dyn FaultSink>))
}

#[rstest]
fn successful_job_records_nothing(sink: Arc<RecordingSink>) {
    let handle = spawn_reported("ok-worker", reporter(&sink), || Ok::<(), JobFailed>(()))
        .expect("spawn");
    handle.join().expect("worker exits normally");
    assert!(sink.entries().is_empty());
}

#[rstest]
fn failing_job_is_reported_with_label(sink: Arc<RecordingSink>) {
    let handle = spawn_reported("sync-worker", reporter(&sink), || Err(JobFailed)).expect("spawn");
    handle.join().expect("worker exits normally");
    assert_eq!(
        sink.entries(),
        [("sync-worker".to_owned(), "queue poisoned".to_owned())]
    );
}

#[rstest]
fn panicking_job_is_contained(sink: Arc<RecordingSink>) {
    let handle = spawn_reported("panicky", reporter(&sink), || -> Result<(), JobFailed> {
        panic!("lost connection");
    })
    .expect("spawn");

    assert!(handle.join().is_ok(), "panic must not reach the joiner");
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    let (label, fault) = entries.first().expect("one entry");
    assert_eq!(label, "panicky");
    assert!(fault.contains("lost connection"), "{fault}");
}

#[rstest]
fn workers_carry_their_label_as_thread_name(sink: Arc<RecordingSink>) {
    let observed = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&observed);
    spawn_reported("named-worker", reporter(&sink), move || {
        *slot.lock().expect("slot") = thread::current().name().map(str::to_owned);
        Ok::<(), JobFailed>(())
    })
    .expect("spawn")
    .join()
    .expect("join");

    assert_eq!(observed.lock().expect("slot").as_deref(), Some("named-worker"));
}
