// State module - Test outcome state management
// One record per test case identity, routed by derived name + file path

pub mod record;

pub use record::TestRecord;

use crate::event::PhaseEvent;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Canonical test status.
///
/// `Pending` exists only between record creation and the first applied
/// event; it never appears in serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Pending,
    Other,
}

impl TestStatus {
    /// Canonical lowercase string form used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Pending => "pending",
            TestStatus::Other => "other",
        }
    }

    /// Terminal statuses are immune to further overwrite.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Skipped)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a test case: derived name plus file path,
/// independent of parameterization suffixes.
type TestIdentity = (String, String);

/// Record registry for one test run.
///
/// Routes each phase event to the record owned by that test case identity,
/// creating the record on first sight. Not internally synchronized: with
/// parallel workers, each identity's events must be funneled through a
/// single owner.
#[derive(Debug, Clone, Default)]
pub struct TestRun {
    records: IndexMap<TestIdentity, TestRecord>,
}

impl TestRun {
    /// Create an empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the record for its test case identity.
    pub fn apply(&mut self, event: &PhaseEvent) {
        self.apply_with_worker(event, None);
    }

    /// Like [`apply`], stamping a worker id on newly created records.
    ///
    /// [`apply`]: TestRun::apply
    pub fn apply_with_worker(&mut self, event: &PhaseEvent, worker_id: Option<&str>) {
        let identity = identity_of(event);
        self.records
            .entry(identity)
            .or_insert_with(|| TestRecord::new(event, worker_id.map(str::to_string)))
            .update(event);
    }

    /// Look up the record for a derived name and file path.
    pub fn get(&self, name: &str, file_path: &str) -> Option<&TestRecord> {
        self.records
            .get(&(name.to_string(), file_path.to_string()))
    }

    /// Mutable lookup, for host-driven updates such as retry counts.
    pub fn get_mut(&mut self, name: &str, file_path: &str) -> Option<&mut TestRecord> {
        self.records
            .get_mut(&(name.to_string(), file_path.to_string()))
    }

    /// Number of distinct test cases seen so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no event has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.values()
    }

    /// Consume the run, yielding records in first-seen order.
    pub fn into_records(self) -> impl Iterator<Item = TestRecord> {
        self.records.into_values()
    }
}

fn identity_of(event: &PhaseEvent) -> TestIdentity {
    (event.derived_name().to_string(), event.file_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Outcome, Phase};

    fn event(raw_id: &str, outcome: Outcome) -> PhaseEvent {
        PhaseEvent::new(Phase::Call, outcome, raw_id, "tests/test_mod.py")
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(TestStatus::Passed.as_str(), "passed");
        assert_eq!(TestStatus::Failed.as_str(), "failed");
        assert_eq!(TestStatus::Skipped.as_str(), "skipped");
        assert_eq!(TestStatus::Pending.as_str(), "pending");
        assert_eq!(TestStatus::Other.as_str(), "other");
    }

    #[test]
    fn test_status_terminality() {
        assert!(TestStatus::Failed.is_terminal());
        assert!(TestStatus::Skipped.is_terminal());
        assert!(!TestStatus::Passed.is_terminal());
        assert!(!TestStatus::Pending.is_terminal());
        assert!(!TestStatus::Other.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TestStatus::Passed).expect("serialize status");
        assert_eq!(json, "\"passed\"");
    }

    #[test]
    fn test_run_routes_same_identity_to_one_record() {
        // Arrange
        let mut run = TestRun::new();

        // Act
        run.apply(&event("tests/test_mod.py::test_a", Outcome::Passed));
        run.apply(&event("tests/test_mod.py::test_a", Outcome::Failed));

        // Assert
        assert_eq!(run.len(), 1);
        let record = run
            .get("tests/test_mod.py::test_a", "tests/test_mod.py")
            .expect("record exists");
        assert_eq!(record.status(), TestStatus::Failed);
    }

    #[test]
    fn test_run_parameterized_ids_share_a_record() {
        let mut run = TestRun::new();
        run.apply(&event("tests/test_mod.py::test_a[1]", Outcome::Passed));
        run.apply(&event("tests/test_mod.py::test_a[2]", Outcome::Passed));
        assert_eq!(run.len(), 1);
    }

    #[test]
    fn test_run_distinct_identities_get_distinct_records() {
        let mut run = TestRun::new();
        run.apply(&event("tests/test_mod.py::test_a", Outcome::Passed));
        run.apply(&event("tests/test_mod.py::test_b", Outcome::Skipped));
        assert_eq!(run.len(), 2);
    }

    #[test]
    fn test_run_preserves_first_seen_order() {
        let mut run = TestRun::new();
        run.apply(&event("m::test_c", Outcome::Passed));
        run.apply(&event("m::test_a", Outcome::Passed));
        run.apply(&event("m::test_b", Outcome::Passed));
        let names: Vec<_> = run.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, ["m::test_c", "m::test_a", "m::test_b"]);
    }

    #[test]
    fn test_run_stamps_worker_on_creation_only() {
        let mut run = TestRun::new();
        run.apply_with_worker(&event("m::test_a", Outcome::Passed), Some("gw1"));
        run.apply_with_worker(&event("m::test_a", Outcome::Passed), Some("gw2"));
        let record = run
            .get("m::test_a", "tests/test_mod.py")
            .expect("record exists");
        assert_eq!(record.worker_id(), Some("gw1"));
    }

    #[test]
    fn test_run_get_mut_for_retries() {
        let mut run = TestRun::new();
        run.apply(&event("m::test_a", Outcome::Passed));
        run.get_mut("m::test_a", "tests/test_mod.py")
            .expect("record exists")
            .add_retry();
        let record = run
            .get("m::test_a", "tests/test_mod.py")
            .expect("record exists");
        assert_eq!(record.retries(), 1);
    }
}
