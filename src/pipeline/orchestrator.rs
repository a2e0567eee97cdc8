use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::context::RunContext;
use super::error_handler::{PipelineError, check_for_first_error_or_failed_items};
use super::stage::{Stage, Stages};

pub type StageHandle = JoinHandle<Result<()>>;

/// Handles returned by [`spawn_pipeline`] for streaming: receive results from `output_rx`, then
/// pass the handles to [`shutdown_pipeline_handles`].
pub struct PipelineHandles<T> {
    pub output_rx: Receiver<T>,
    pub source_handle: JoinHandle<usize>,
    pub stage_handles: Vec<(String, StageHandle)>,
}

/// Start the source thread and one thread per stage, chained by bounded channels.
/// Fails before spawning anything when there are no stages or `ctx` does not validate.
pub fn spawn_pipeline<T, I>(
    stages: Stages<T>,
    source: I,
    ctx: &Arc<RunContext>,
) -> Result<PipelineHandles<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    spawn_pipeline_with(stages, source, ctx, spawn_stage_thread)
}

/// [`spawn_pipeline`] with a caller-supplied stage launcher, called as
/// `spawn_stage(idx, stage, input, output, ctx)`.
///
/// If a launch fails, the run is cancelled and every thread already started is joined before
/// the error is returned.
pub fn spawn_pipeline_with<T, I, F>(
    stages: Stages<T>,
    source: I,
    ctx: &Arc<RunContext>,
    mut spawn_stage: F,
) -> Result<PipelineHandles<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    F: FnMut(usize, Box<dyn Stage<T>>, Receiver<T>, Sender<T>, Arc<RunContext>) -> Result<StageHandle>,
{
    if stages.is_empty() {
        return Err(PipelineError::NoStages.into());
    }
    ctx.validate()?;

    let (source_tx, mut prev_rx) = bounded::<T>(ctx.channel_cap);
    let source_handle = spawn_source_thread(source_tx, source.into_iter(), Arc::clone(ctx))?;

    let mut stage_handles = Vec::with_capacity(stages.len());
    for (idx, stage) in stages.into_iter().enumerate() {
        let (tx, rx) = bounded::<T>(ctx.channel_cap);
        let name = stage.name().to_string();
        let handle = match spawn_stage(idx, stage, prev_rx, tx, Arc::clone(ctx)) {
            Ok(h) => h,
            Err(e) => {
                // The failed launch dropped its channel ends, so the last started stage's output
                // is closed and nothing started can block forever.
                ctx.cancel.cancel();
                drop(rx);
                let sent = shutdown_pipeline_handles(source_handle, stage_handles, ctx);
                debug!("pipeline start failed at stage {}: joined ({} source items)", idx, sent);
                return Err(e);
            }
        };
        stage_handles.push((name, handle));
        prev_rx = rx;
    }
    debug!(
        "pipeline started: {} stages, max {} in flight per stage, channel cap {}",
        stage_handles.len(),
        ctx.max_in_flight,
        ctx.channel_cap
    );

    Ok(PipelineHandles {
        output_rx: prev_rx,
        source_handle,
        stage_handles,
    })
}

fn spawn_source_thread<T, It>(
    tx: Sender<T>,
    source: It,
    ctx: Arc<RunContext>,
) -> Result<JoinHandle<usize>>
where
    T: Send + 'static,
    It: Iterator<Item = T> + Send + 'static,
{
    thread::Builder::new()
        .name("pipeline-source".to_string())
        .spawn(move || {
            let mut count = 0_usize;
            for item in source {
                if ctx.is_cancelled() || tx.send(item).is_err() {
                    break;
                }
                count += 1;
            }
            debug!("source: sent {} items", count);
            count
        })
        .context("spawn source thread")
}

/// Default stage launcher: a named OS thread that runs the stage and records its error on `ctx`.
pub fn spawn_stage_thread<T>(
    idx: usize,
    mut stage: Box<dyn Stage<T>>,
    input: Receiver<T>,
    output: Sender<T>,
    ctx: Arc<RunContext>,
) -> Result<StageHandle>
where
    T: Send + 'static,
{
    let thread_name = format!("stage-{}-{}", idx, stage.name());
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            // `output` moves into `run` and is dropped when it returns or unwinds.
            let result = stage.run(input, output, &ctx);
            if let Err(e) = &result {
                ctx.record_error(PipelineError::StageFailed {
                    stage: stage.name().to_string(),
                    reason: format!("{:#}", e),
                });
            }
            debug!("{}: finished", stage.name());
            result
        })
        .with_context(|| format!("spawn {}", thread_name))
}

/// Join source and stage threads (after the output stream is drained). Panicked stages are
/// recorded on `ctx` so [`check_for_first_error_or_failed_items`] reports them.
pub fn shutdown_pipeline_handles(
    source_handle: JoinHandle<usize>,
    stage_handles: Vec<(String, StageHandle)>,
    ctx: &RunContext,
) -> usize {
    let sent = match source_handle.join() {
        Ok(n) => n,
        Err(_) => {
            ctx.record_error(PipelineError::StagePanicked("source".to_string()));
            0
        }
    };
    for (name, h) in stage_handles {
        if h.join().is_err() {
            ctx.record_error(PipelineError::StagePanicked(name));
        }
    }
    sent
}

/// Main executor: run `stages` over `source` and collect everything the last stage emits.
/// Source → stage 1 → … → stage N → Vec. Blocks until every thread has exited.
pub fn run_pipeline<T, I>(stages: Stages<T>, source: I, ctx: &Arc<RunContext>) -> Result<Vec<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let PipelineHandles {
        output_rx,
        source_handle,
        stage_handles,
    } = spawn_pipeline(stages, source, ctx)?;

    let outputs: Vec<T> = output_rx.iter().collect();
    debug!(
        "main: output channel closed, {} results collected",
        outputs.len()
    );

    let sent = shutdown_pipeline_handles(source_handle, stage_handles, ctx);
    debug!("main: all stages joined ({} source items)", sent);
    check_for_first_error_or_failed_items(ctx)?;

    Ok(outputs)
}
