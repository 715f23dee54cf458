//! The stage sequencer.
//!
//! Runs a fixed, ordered list of [`Stage`]s one at a time. The first
//! failure of a required stage ends the run; nothing after it executes.
//! Optional stage failures are recorded as warnings and the run moves on.
//!
//! Each stage boundary is logged as a single delimited line
//! (`===== stage migrate started =====`) carrying `stage`, `index` and
//! `required` fields, so log scrapers can segment output per stage.

use std::collections::HashSet;
use std::time::Instant;

use crate::error::{PlanError, StageError};
use crate::run::{BootstrapRun, StageFailure};
use crate::stage::Stage;

/// Delimiter that brackets every stage boundary marker.
pub const MARKER_DELIMITER: &str = "=====";

/// Format a stage boundary marker, e.g. `===== stage migrate started =====`.
pub fn marker(stage: &str, event: &str) -> String {
    format!("{MARKER_DELIMITER} stage {stage} {event} {MARKER_DELIMITER}")
}

/// Format the failure marker, `===== stage <name> failed: <cause> =====`.
///
/// Required and optional stages share this form; the `required` field on
/// the log event tells them apart.
pub fn failure_marker(stage: &str, error: &StageError) -> String {
    marker(stage, &format!("failed: {error}"))
}

/// Check the input constraints: at least one stage, no repeated names.
pub fn validate(stages: &[Stage]) -> Result<(), PlanError> {
    if stages.is_empty() {
        return Err(PlanError::Empty);
    }

    let mut seen = HashSet::with_capacity(stages.len());
    for stage in stages {
        if !seen.insert(stage.name()) {
            return Err(PlanError::DuplicateStage(stage.name().to_string()));
        }
    }
    Ok(())
}

/// Execute `stages` in order and return the finished run.
///
/// The returned run is either `Succeeded` or `Failed`. A handoff stage
/// that replaces the process never lets this function return at all.
pub async fn run(stages: &[Stage]) -> Result<BootstrapRun, PlanError> {
    validate(stages)?;

    let mut run = BootstrapRun::new();
    let plan: Vec<&str> = stages.iter().map(Stage::name).collect();
    tracing::info!(stages = ?plan, "Bootstrap run starting");

    for (index, stage) in stages.iter().enumerate() {
        let name = stage.name();
        let required = stage.is_required();

        run.begin_stage(index);
        tracing::info!(stage = name, index, required, "{}", marker(name, "started"));

        let start = Instant::now();
        let result = stage.execute().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(stage = name, index, elapsed_ms, "{}", marker(name, "completed"));
                run.complete_stage(name);
            }
            Err(error) if required => {
                tracing::error!(
                    stage = name,
                    index,
                    required,
                    elapsed_ms,
                    kind = error.kind(),
                    exit_code = error.exit_code(),
                    "{}",
                    failure_marker(name, &error),
                );
                run.fail(StageFailure {
                    stage: name.to_string(),
                    error,
                });
                return Ok(run);
            }
            Err(error) => {
                tracing::warn!(
                    stage = name,
                    index,
                    required,
                    elapsed_ms,
                    kind = error.kind(),
                    "{}",
                    failure_marker(name, &error),
                );
                run.record_warning(StageFailure {
                    stage: name.to_string(),
                    error,
                });
            }
        }
    }

    run.succeed();
    tracing::info!(
        completed = run.completed().len(),
        warnings = run.warnings().len(),
        elapsed_ms = run.elapsed().as_millis() as u64,
        "Bootstrap run succeeded",
    );
    Ok(run)
}
