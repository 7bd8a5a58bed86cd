// Test record - per-test-case outcome aggregation
// Folds phase events into one canonical record: status, timing, message, trace

use crate::event::{EventMetadata, Outcome, Phase, PhaseEvent};
use crate::state::TestStatus;
use tracing::{debug, trace};

/// One canonical record per test case identity.
///
/// Fields are private: the status precedence, duration growth, and
/// start/stop write-once invariants are only enforced through [`new`],
/// [`update`], and the guarded [`set_status`] setter.
///
/// [`new`]: TestRecord::new
/// [`update`]: TestRecord::update
/// [`set_status`]: TestRecord::set_status
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    name: String,
    status: TestStatus,
    raw_status: Option<String>,
    duration_ms: f64,
    start: f64,
    stop: f64,
    retries: u32,
    message: Option<String>,
    trace: Option<String>,
    file_path: String,
    tags: Vec<String>,
    browser: Option<String>,
    worker_id: Option<String>,
}

impl TestRecord {
    /// Create a record from the first phase event of a test case.
    ///
    /// The name is the raw identifier truncated at the first `[`, so all
    /// parameterizations of a test fold into one record. The event's outcome
    /// is applied immediately: a record that has seen an event is never
    /// observable as `Pending`.
    pub fn new(event: &PhaseEvent, worker_id: Option<String>) -> Self {
        let mut record = Self {
            name: event.derived_name().to_string(),
            status: TestStatus::Pending,
            raw_status: None,
            duration_ms: 0.0,
            start: 0.0,
            stop: 0.0,
            retries: 0,
            message: None,
            trace: None,
            file_path: event.file_path.clone(),
            tags: Vec::new(),
            browser: None,
            worker_id,
        };
        record.derive_status(event);
        record
    }

    /// Fold one phase event into the record.
    ///
    /// Tolerates any phase order and replayed phases (retries): status
    /// derivation is idempotent, duration only accumulates, and start/stop
    /// keep their first observed value.
    pub fn update(&mut self, event: &PhaseEvent) {
        self.derive_status(event);

        // Hosts report phase durations in seconds, CTRF wants milliseconds.
        self.duration_ms += 1000.0 * event.duration;
        if event.phase == Phase::Setup && self.start == 0.0 {
            self.start = event.start;
        }
        if event.phase == Phase::Teardown && self.stop == 0.0 {
            self.stop = event.stop;
        }

        if let Some(text) = event.failure_text.as_deref()
            && !text.is_empty()
        {
            // Last non-empty write wins, even after a terminal status.
            self.trace = Some(text.to_string());
        }

        if let Some(EventMetadata { tags, browser }) = &event.metadata {
            self.tags = tags.clone();
            self.browser = browser.clone();
        }
    }

    // Status derivation policy. Terminal statuses win over everything;
    // failure additionally fixes the raw status and the user-facing message.
    fn derive_status(&mut self, event: &PhaseEvent) {
        if self.status.is_terminal() {
            trace!(
                test = %self.name,
                status = %self.status,
                outcome = %event.outcome,
                "status is terminal, ignoring event outcome"
            );
            return;
        }

        match event.outcome {
            Outcome::Skipped => self.transition(TestStatus::Skipped),
            Outcome::Failed => {
                self.transition(TestStatus::Failed);
                self.raw_status = Some(format!("{}_{}", event.phase, event.outcome));
                let mut message = format!("The test failed in the {} phase", event.phase);
                if let Some(text) = event.failure_text.as_deref() {
                    if text.contains("AssertionError") {
                        message.push_str(" due to an assertion error");
                    } else if text.contains("Exception") {
                        message.push_str(" due to an exception");
                    }
                }
                self.message = Some(message);
            }
            Outcome::Passed => self.transition(TestStatus::Passed),
            Outcome::Other => self.transition(TestStatus::Other),
        }
    }

    fn transition(&mut self, status: TestStatus) {
        debug!(test = %self.name, from = %self.status, to = %status, "status transition");
        self.status = status;
    }

    /// Current status.
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Guarded status setter for external callers.
    ///
    /// An in-progress (`Pending`) or passing record may still be overridden;
    /// assigning while the status is `Skipped` or `Failed` is a silent no-op.
    pub fn set_status(&mut self, status: TestStatus) {
        match self.status {
            TestStatus::Pending | TestStatus::Passed => self.transition(status),
            TestStatus::Skipped | TestStatus::Failed | TestStatus::Other => {
                trace!(
                    test = %self.name,
                    status = %self.status,
                    rejected = %status,
                    "status override rejected"
                );
            }
        }
    }

    /// Stable test name (parameterization suffix stripped).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fine-grained status string, set only on failure (e.g. `call_failed`).
    pub fn raw_status(&self) -> Option<&str> {
        self.raw_status.as_deref()
    }

    /// Accumulated elapsed time in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Absolute start timestamp from the first setup event; 0.0 when unset.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Absolute stop timestamp from the first teardown event; 0.0 when unset.
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// Re-execution count for this test case.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Set the re-execution count. Retries are driven by the host; this
    /// crate never infers them from the event stream.
    pub fn set_retries(&mut self, retries: u32) {
        self.retries = retries;
    }

    /// Increment the re-execution count by one.
    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    /// Human-readable failure explanation, populated only on failure.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Raw failure detail text; last non-empty capture wins.
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// Source location of the test, fixed at creation.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Instrumentation tags from the latest metadata merge.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Browser identifier from the latest metadata merge.
    pub fn browser(&self) -> Option<&str> {
        self.browser.as_deref()
    }

    /// Worker that owned this test case, when the host runs parallel workers.
    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }
}
