pub mod event;
pub mod report;
pub mod state;

pub use event::{EventMetadata, Outcome, ParseEventError, Phase, PhaseEvent};
pub use report::{CtrfExtra, CtrfTest};
pub use state::{TestRecord, TestRun, TestStatus};
