//! Stage descriptors.
//!
//! A [`Stage`] pairs a unique name with the action that performs it and
//! a flag saying whether its failure aborts the run. Stage lists are
//! built once at startup and never reordered.

use std::fmt;

use async_trait::async_trait;

use crate::error::StageError;

/// The work a stage performs, delegated to an external collaborator.
///
/// Implementations must be idempotent: a container restart re-runs the
/// whole sequence from the first stage.
#[async_trait]
pub trait StageAction: Send + Sync {
    async fn execute(&self) -> Result<(), StageError>;
}

/// One discrete, ordered step of the bootstrap sequence.
pub struct Stage {
    name: String,
    required: bool,
    action: Box<dyn StageAction>,
}

impl Stage {
    /// A stage whose failure aborts the run.
    pub fn required(name: impl Into<String>, action: impl StageAction + 'static) -> Self {
        Self {
            name: name.into(),
            required: true,
            action: Box::new(action),
        }
    }

    /// A stage whose failure is logged and then skipped over.
    pub fn optional(name: impl Into<String>, action: impl StageAction + 'static) -> Self {
        Self {
            name: name.into(),
            required: false,
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) async fn execute(&self) -> Result<(), StageError> {
        self.action.execute().await
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
