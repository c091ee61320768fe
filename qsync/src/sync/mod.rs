//! Batch construction and multi-target sync orchestration.
//!
//! - [`CommandBatch`] - the ordered resync command sequence
//! - [`SyncOrchestrator`] - filter decisions, concurrent fan-out, and
//!   ownership of the accepted position

mod batch;
mod orchestrator;

pub use batch::CommandBatch;
pub use orchestrator::{SyncOrchestrator, SyncOutcome};
