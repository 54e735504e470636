//! Stage definitions
//!
//! The built-in catalog describes how each test binary is invoked. Paths are
//! resolved once at startup against the executable directory and the log
//! directory, after which a [`Stage`] is immutable.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::classify::{Classifier, MarkerClassifier};
use crate::common::config::Config;

/// Success marker printed by a gtest binary when exactly one test passed
pub const DEFAULT_PASS_MARKER: &str = "[  PASSED  ] 1 test";

/// The five test activities the runner knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Normal,
    VolDel,
    Recovery,
    Mapping,
    Load,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Normal,
        StageKind::VolDel,
        StageKind::Recovery,
        StageKind::Mapping,
        StageKind::Load,
    ];

    /// Identifier used on the command line and in config files
    pub fn name(self) -> &'static str {
        match self {
            StageKind::Normal => "normal",
            StageKind::VolDel => "vol_del",
            StageKind::Recovery => "recovery",
            StageKind::Mapping => "mapping",
            StageKind::Load => "load",
        }
    }

    /// Human-readable label used in notifications
    pub fn label(self) -> &'static str {
        match self {
            StageKind::Normal => "Normal",
            StageKind::VolDel => "Volume Delete",
            StageKind::Recovery => "Recovery",
            StageKind::Mapping => "Mapping",
            StageKind::Load => "Load",
        }
    }

    /// Exact, case-sensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An executable plus its argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl StageCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a stage is executed and judged
#[derive(Debug, Clone)]
pub enum StagePlan {
    /// Run once, capture stdout, write it to `log_path`, judge it with `classifier`
    Captured {
        command: StageCommand,
        log_path: PathBuf,
        classifier: Arc<dyn Classifier>,
    },
    /// Crash the engine with `abort`, then check that `recover` exits cleanly
    Recovery {
        abort: StageCommand,
        recover: StageCommand,
    },
}

/// One test activity, ready to run
#[derive(Debug, Clone)]
pub struct Stage {
    pub kind: StageKind,
    pub plan: StagePlan,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Log destination, for stages that capture output
    pub fn log_path(&self) -> Option<&Path> {
        match &self.plan {
            StagePlan::Captured { log_path, .. } => Some(log_path.as_path()),
            StagePlan::Recovery { .. } => None,
        }
    }

    /// Replace how captured output is judged; no effect on the recovery stage
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        if let StagePlan::Captured { classifier: current, .. } = &mut self.plan {
            *current = classifier;
        }
        self
    }

    /// Build a stage from the built-in catalog, applying any config override
    pub fn resolve(kind: StageKind, bin_dir: &Path, log_dir: &Path, config: &Config) -> Self {
        let ovr = config.stage_override(kind.name()).cloned().unwrap_or_default();

        let plan = match kind {
            StageKind::Recovery => {
                let program = bin_dir.join(ovr.executable.as_deref().unwrap_or("test_volume"));
                StagePlan::Recovery {
                    abort: StageCommand::new(
                        program.clone(),
                        [
                            "--gtest_filter=*abort_random*",
                            "--run_time=300",
                            "--enable_crash_handler=0",
                        ],
                    ),
                    recover: StageCommand::new(
                        program,
                        [
                            "--gtest_filter=*recovery_random*",
                            "--run_time=300",
                            "--enable_crash_handler=1",
                        ],
                    ),
                }
            }
            _ => {
                let (executable, args, log_file) = captured_defaults(kind);
                let program = bin_dir.join(ovr.executable.as_deref().unwrap_or(executable));
                let args = ovr
                    .args
                    .unwrap_or_else(|| args.iter().map(|a| a.to_string()).collect());
                let log_file = ovr.log_file.as_deref().unwrap_or(log_file);
                StagePlan::Captured {
                    command: StageCommand { program, args },
                    log_path: log_dir.join(log_file),
                    classifier: Arc::new(MarkerClassifier::new(
                        ovr.pass_marker
                            .unwrap_or_else(|| DEFAULT_PASS_MARKER.to_string()),
                    )),
                }
            }
        };

        Self { kind, plan }
    }
}

const NORMAL_ARGS: &[&str] = &["--run_time=12000", "--max_num_writes=5000000"];
const VOL_DEL_ARGS: &[&str] = &["--gtest_filter=*vol_del*"];
const MAPPING_ARGS: &[&str] = &["--num_ios=10000000"];
const LOAD_ARGS: &[&str] = &[
    "--num_io=100000000000",
    "--num_keys=1000000",
    "--run_time=21600",
    "--gtest_filter=Map*",
];

/// Executable, arguments and log file name of the output-captured stages
fn captured_defaults(kind: StageKind) -> (&'static str, &'static [&'static str], &'static str) {
    match kind {
        StageKind::Normal => ("test_volume", NORMAL_ARGS, "log_normal.txt"),
        StageKind::VolDel => ("test_volume", VOL_DEL_ARGS, "log_delete.txt"),
        StageKind::Mapping => ("test_mapping", MAPPING_ARGS, "log_mapping.txt"),
        StageKind::Load => ("test_load", LOAD_ARGS, "log_load.txt"),
        StageKind::Recovery => unreachable!("recovery is not an output-captured stage"),
    }
}
