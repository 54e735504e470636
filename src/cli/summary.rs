//! Terminal summary of a run

use colored::Colorize;

use crate::common::FailureReason;
use crate::dispatch::DispatchOutcome;
use crate::runner::{StageKind, StageResult};
use crate::sequence::{PipelineOutcome, PipelineReport};

pub fn print_outcome(outcome: &DispatchOutcome) {
    println!("\n{}", "Results:".cyan());
    match outcome {
        DispatchOutcome::Stage(result) => {
            print_result(result);
            print_verdict(result.passed);
        }
        DispatchOutcome::Sequence(report) => print_report(report),
    }
}

pub fn print_stage_error(stage: &str, reason: &FailureReason) {
    let label = StageKind::from_name(stage).map_or(stage, |kind| kind.label());
    println!("\n{}", "Results:".cyan());
    println!("  {} {}: {}", "✗".red(), label, reason.to_string().dimmed());
    print_verdict(false);
}

fn print_report(report: &PipelineReport) {
    for result in &report.results {
        print_result(result);
    }
    if let PipelineOutcome::Halted { stage, reason } = &report.outcome {
        // Spawn and exit failures leave no result behind
        if report.results.last().map(|r| r.kind) != Some(*stage) {
            println!("  {} {}: {}", "✗".red(), stage.label(), reason.to_string().dimmed());
        }
        println!(
            "  {} {}",
            "Pipeline halted at".yellow(),
            stage.label().yellow().bold()
        );
    }
    print_verdict(report.passed());
}

fn print_result(result: &StageResult) {
    let mark = if result.passed {
        "✓".green()
    } else {
        "✗".red()
    };
    let mut line = format!(
        "  {} {} ({}s)",
        mark,
        result.kind.label(),
        result.elapsed.as_secs()
    );
    if let Some(code) = result.exit_code.filter(|c| *c != 0) {
        line.push_str(&format!(" {}", format!("exit status {code}").dimmed()));
    }
    match (&result.log_path, result.log_written) {
        (Some(path), true) => line.push_str(&format!(" {}", path.display().to_string().dimmed())),
        (Some(path), false) => line.push_str(&format!(
            " {}",
            format!("log not written: {}", path.display()).yellow()
        )),
        (None, _) => {}
    }
    println!("{line}");
}

fn print_verdict(passed: bool) {
    if passed {
        println!("\n{} {}\n", "✓".green().bold(), "Regression Passed".green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), "Regression Failed".red().bold());
    }
}
