// Phase events - the host runtime boundary
// One event per phase per test case execution; retries replay the sequence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a host-supplied phase or outcome string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct ParseEventError {
    kind: &'static str,
    value: String,
}

/// Execution phase of a single test case run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
}

impl Phase {
    /// Canonical lowercase name, as it appears in raw statuses and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Call => "call",
            Phase::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ParseEventError;

    // Strict: the phase name lands verbatim in report raw statuses,
    // so an unknown string is a producer defect, not a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Self::Setup),
            "call" => Ok(Self::Call),
            "teardown" => Ok(Self::Teardown),
            _ => Err(ParseEventError {
                kind: "phase",
                value: s.to_string(),
            }),
        }
    }
}

/// Outcome classification reported by the host for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Other,
}

impl Outcome {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
            Outcome::Other => "other",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            "other" => Ok(Self::Other),
            _ => Err(ParseEventError {
                kind: "outcome",
                value: s.to_string(),
            }),
        }
    }
}

/// Instrumentation metadata attached to an event by external tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub tags: Vec<String>,
    pub browser: Option<String>,
}

/// One notification describing the outcome of a single phase of one
/// test case execution.
///
/// This is the minimal shape the aggregator needs; hosts map their own
/// callback/report objects into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseEvent {
    /// Which phase this event describes.
    pub phase: Phase,

    /// Outcome classification for this phase.
    pub outcome: Outcome,

    /// Raw test identifier, possibly carrying a `[...]` parameterization
    /// suffix (e.g. `tests/test_login.py::test_ok[chrome]`).
    pub raw_id: String,

    /// Source location of the test.
    pub file_path: String,

    /// Elapsed time of this phase, in seconds.
    pub duration: f64,

    /// Absolute start timestamp; 0.0 when not provided.
    pub start: f64,

    /// Absolute stop timestamp; 0.0 when not provided.
    pub stop: f64,

    /// Long-form failure detail text, when the host captured any.
    pub failure_text: Option<String>,

    /// Externally attached instrumentation metadata.
    pub metadata: Option<EventMetadata>,
}

impl PhaseEvent {
    /// Create an event with no timing, failure text, or metadata.
    pub fn new(
        phase: Phase,
        outcome: Outcome,
        raw_id: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            outcome,
            raw_id: raw_id.into(),
            file_path: file_path.into(),
            duration: 0.0,
            start: 0.0,
            stop: 0.0,
            failure_text: None,
            metadata: None,
        }
    }

    /// Test name with any `[...]` parameterization suffix stripped.
    ///
    /// All parameterizations of a test share one derived name, which is the
    /// name half of the test case identity.
    pub fn derived_name(&self) -> &str {
        self.raw_id.split('[').next().unwrap_or(&self.raw_id)
    }

    /// Set the elapsed duration in seconds.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    /// Set the absolute start/stop timestamps.
    pub fn with_timestamps(mut self, start: f64, stop: f64) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    /// Attach long-form failure detail text.
    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = Some(text.into());
        self
    }

    /// Attach instrumentation metadata.
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
