//! Common utilities shared by the runner, sequencer and CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, FailureReason, Result};
