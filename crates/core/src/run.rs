//! A single execution of the bootstrap sequence.
//!
//! [`BootstrapRun`] replaces an ambient "last exit status" with an
//! explicit value threaded through the sequencer. It only moves forward:
//! `Pending -> Running -> Succeeded | Failed`, and the stage index never
//! decreases.

use std::fmt;
use std::time::Duration;

use chrono::Utc;

use crate::error::StageError;
use crate::types::Timestamp;

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// `Succeeded` and `Failed` never change once reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// A stage error tagged with the stage that reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: String,
    pub error: StageError,
}

impl StageFailure {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage '{}' failed: {}", self.stage, self.error)
    }
}

/// One execution instance of the bootstrap sequence.
#[derive(Debug, Clone)]
pub struct BootstrapRun {
    started_at: Timestamp,
    current_stage_index: usize,
    status: RunStatus,
    failure_cause: Option<StageFailure>,
    /// Failures of optional stages, in the order they happened.
    warnings: Vec<StageFailure>,
    completed: Vec<String>,
    /// Every status the run has held, starting with `Pending`. A new
    /// `Running` entry is recorded as each stage begins.
    history: Vec<RunStatus>,
}

impl Default for BootstrapRun {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapRun {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            current_stage_index: 0,
            status: RunStatus::Pending,
            failure_cause: None,
            warnings: Vec::new(),
            completed: Vec::new(),
            history: vec![RunStatus::Pending],
        }
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn failure_cause(&self) -> Option<&StageFailure> {
        self.failure_cause.as_ref()
    }

    pub fn warnings(&self) -> &[StageFailure] {
        &self.warnings
    }

    /// Names of stages that finished successfully, in execution order.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn history(&self) -> &[RunStatus] {
        &self.history
    }

    /// Exit code for a failed run, `None` otherwise.
    pub fn exit_code(&self) -> Option<i32> {
        self.failure_cause.as_ref().map(StageFailure::exit_code)
    }

    /// Wall-clock time since the run was created.
    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.started_at).to_std().unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Transitions (driven by the sequencer only)
    // -----------------------------------------------------------------------

    pub(crate) fn begin_stage(&mut self, index: usize) {
        debug_assert!(!self.status.is_terminal(), "run already finished");
        debug_assert!(index >= self.current_stage_index, "stage index went backwards");
        self.current_stage_index = index;
        self.transition(RunStatus::Running);
    }

    pub(crate) fn complete_stage(&mut self, name: &str) {
        self.completed.push(name.to_string());
    }

    pub(crate) fn record_warning(&mut self, failure: StageFailure) {
        self.warnings.push(failure);
    }

    pub(crate) fn fail(&mut self, failure: StageFailure) {
        self.failure_cause = Some(failure);
        self.transition(RunStatus::Failed);
    }

    pub(crate) fn succeed(&mut self) {
        self.transition(RunStatus::Succeeded);
    }

    fn transition(&mut self, next: RunStatus) {
        if self.status.is_terminal() {
            tracing::warn!(from = ?self.status, to = ?next, "Ignoring transition out of a terminal run status");
            return;
        }
        self.status = next;
        self.history.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;

    fn failure() -> StageFailure {
        StageFailure {
            stage: "migrate".to_string(),
            error: MigrationError::Apply("checksum mismatch".into()).into(),
        }
    }

    #[test]
    fn new_run_is_pending() {
        let run = BootstrapRun::new();
        assert_eq!(run.status(), RunStatus::Pending);
        assert_eq!(run.current_stage_index(), 0);
        assert!(run.failure_cause().is_none());
        assert_eq!(run.history(), &[RunStatus::Pending]);
        assert_eq!(run.exit_code(), None);
    }

    #[test]
    fn terminal_status_does_not_change() {
        let mut run = BootstrapRun::new();
        run.begin_stage(0);
        run.fail(failure());
        run.succeed();

        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(
            run.history(),
            &[RunStatus::Pending, RunStatus::Running, RunStatus::Failed]
        );
    }

    #[test]
    fn failed_run_reports_stage_exit_code() {
        let mut run = BootstrapRun::new();
        run.begin_stage(1);
        run.fail(failure());
        assert_eq!(run.exit_code(), Some(20));
        assert_eq!(
            run.failure_cause().map(ToString::to_string).as_deref(),
            Some("stage 'migrate' failed: Migration failed: checksum mismatch")
        );
    }
}
