// Report module - CTRF test fragment serialization
// Projects a finalized record into the canonical report field mapping

use crate::state::{TestRecord, TestStatus};
use serde::Serialize;

/// Canonical CTRF test fragment.
///
/// Field declaration order is the report field order. The omission rule is
/// uniform: a key is dropped when its value would be null, an empty string,
/// or an empty sequence, so key presence always means "value is meaningful".
/// Numeric zero is a legitimate value and is always emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrfTest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "is_absent")]
    pub raw_status: Option<String>,
    pub duration: f64,
    pub start: f64,
    pub stop: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "is_absent")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "is_absent")]
    pub trace: Option<String>,
    #[serde(skip_serializing_if = "is_absent")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<CtrfExtra>,
}

/// Tool-specific extension fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrfExtra {
    pub worker: String,
}

// None and Some("") are both "absent" under the omission rule.
fn is_absent(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

impl CtrfTest {
    /// Project a record into the canonical field mapping.
    ///
    /// A retry count of exactly 1 is omitted (a single retry is not
    /// independently meaningful); any other count, including 0, is kept.
    pub fn from_record(record: &TestRecord) -> Self {
        let retries = match record.retries() {
            1 => None,
            n => Some(n),
        };
        let extra = record
            .worker_id()
            .filter(|worker| !worker.is_empty())
            .map(|worker| CtrfExtra {
                worker: worker.to_string(),
            });

        Self {
            name: record.name().to_string(),
            status: record.status(),
            raw_status: record.raw_status().map(str::to_string),
            duration: record.duration_ms(),
            start: record.start(),
            stop: record.stop(),
            retries,
            file_path: record.file_path().to_string(),
            tags: record.tags().to_vec(),
            browser: record.browser().map(str::to_string),
            trace: record.trace().map(str::to_string),
            message: record.message().map(str::to_string),
            extra,
        }
    }
}

/// Serialize a record into a JSON report fragment.
pub fn serialize(record: &TestRecord) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(CtrfTest::from_record(record))
}

/// Render a record's report fragment as a JSON string.
pub fn to_string(record: &TestRecord) -> serde_json::Result<String> {
    serde_json::to_string(&CtrfTest::from_record(record))
}
