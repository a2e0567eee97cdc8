//! Pipeline components: run context, stage interface, executor, error handling.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod stage;

pub use context::{CancelToken, InFlightLimiter, InFlightPermit, RunContext};
pub use error_handler::{PipelineError, check_for_first_error_or_failed_items};
pub use orchestrator::{
    PipelineHandles, StageHandle, run_pipeline, shutdown_pipeline_handles, spawn_pipeline,
    spawn_pipeline_with, spawn_stage_thread,
};
pub use stage::{FnStage, Stage, Stages};
