//! Submit, poll and report on one export or import
//!
//! - [`orchestrator`] - the `Created → Submitted → Polling → terminal` state machine
//! - [`progress`] - events reported to an optional progress callback

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{OperationMode, OperationOrchestrator, PollSettings};
pub use progress::{ProgressCallback, ProgressEvent};
