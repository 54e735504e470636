//! regress - storage-engine regression runner
//!
//! This library runs the storage engine's test binaries as named stages,
//! judges each run from its textual output and chains stages into a
//! fail-fast regression pipeline.

pub mod cli;
pub mod commands;
pub mod common;
pub mod dispatch;
pub mod notify;
pub mod runner;
pub mod sequence;

// Re-export commonly used types for tests
pub use common::{Error, FailureReason, Result};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use runner::{Stage, StageKind, StageResult, StageRunner};
pub use sequence::{PipelineOutcome, PipelineReport, Sequencer};
