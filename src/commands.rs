//! CLI option and mode definitions
//!
//! Defines the clap arguments and the set of test suites selectable with
//! `--test_suits`.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::runner::StageKind;

#[derive(Parser, Debug)]
#[command(name = "regress", about = "Run the storage-engine regression suites")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Suite to run: normal, vol_del, recovery, mapping, load or sequence
    #[arg(short = 't', long = "test_suits", value_name = "MODE")]
    pub test_suits: Option<String>,

    /// Directory containing the test executables
    #[arg(short = 'd', long = "dirpath", default_value = "./", value_name = "PATH")]
    pub dirpath: PathBuf,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Directory for per-stage log files, overriding the config file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Do not post notifications for this run
    #[arg(long)]
    pub no_notify: bool,

    /// Debug-level diagnostics
    #[arg(long, short)]
    pub verbose: bool,
}

/// What a `--test_suits` value selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A single stage, run without notifications
    Single(StageKind),
    /// The full regression pipeline
    Sequence,
}

impl Mode {
    /// Exact, case-sensitive match against the known suite names
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "sequence" {
            return Some(Mode::Sequence);
        }
        StageKind::from_name(name).map(Mode::Single)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single(kind) => f.write_str(kind.name()),
            Mode::Sequence => f.write_str("sequence"),
        }
    }
}
