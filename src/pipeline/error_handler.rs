use anyhow::Result;
use log::warn;
use std::sync::atomic::Ordering;
use thiserror::Error;

use super::context::RunContext;

/// Failures the executor and the signing stages can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Two digest calls overlapped. The permit type rules this out for well-behaved signers.
    #[error("digest called concurrently; calls must hold the digest lock")]
    DigestContention,
    /// Work for one item failed.
    #[error("stage {stage}: item {item:?} failed: {reason}")]
    ItemFailed {
        stage: String,
        item: String,
        reason: String,
    },
    /// A stage returned an error of its own (not tied to one item).
    #[error("stage {stage} failed: {reason}")]
    StageFailed { stage: String, reason: String },
    /// A stage thread panicked.
    #[error("stage {0} panicked")]
    StagePanicked(String),
    /// `run_pipeline` was given no stages.
    #[error("pipeline has no stages")]
    NoStages,
    /// Settings that cannot run (e.g. zero in-flight items).
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
    /// The run was cancelled before it finished.
    #[error("pipeline run cancelled")]
    Cancelled,
}

/// Check run state after all threads joined: return the first recorded failure, or
/// [`PipelineError::Cancelled`] if the run was stopped without one. Logs sentinel substitutions.
pub fn check_for_first_error_or_failed_items(ctx: &RunContext) -> Result<()> {
    if let Some(err) = ctx.take_first_error() {
        return Err(err.into());
    }
    if ctx.cancel.is_cancelled() {
        return Err(PipelineError::Cancelled.into());
    }
    let failed = ctx.failed_items.load(Ordering::Relaxed);
    if failed > 0 {
        warn!(
            "{} items failed and were replaced by the error sentinel",
            failed
        );
    }
    Ok(())
}
