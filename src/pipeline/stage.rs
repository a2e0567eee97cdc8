//! The stage interface the executor chains together.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::marker::PhantomData;

use super::context::RunContext;

/// One concurrent step of a pipeline.
///
/// `run` reads `input` until it is closed (or the run is cancelled) and sends results on `output`.
/// The stage owns `output`: it is dropped when `run` returns, and together with any clones handed
/// to per-item workers that drop is what closes the channel for the next stage.
pub trait Stage<T>: Send {
    fn name(&self) -> &str;

    fn run(&mut self, input: Receiver<T>, output: Sender<T>, ctx: &RunContext) -> Result<()>;
}

/// Stage built from a closure with the same shape as [`Stage::run`].
pub struct FnStage<T, F> {
    name: String,
    f: F,
    _item: PhantomData<fn(T) -> T>,
}

impl<T, F> FnStage<T, F>
where
    F: FnMut(Receiver<T>, Sender<T>, &RunContext) -> Result<()> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _item: PhantomData,
        }
    }
}

impl<T, F> Stage<T> for FnStage<T, F>
where
    F: FnMut(Receiver<T>, Sender<T>, &RunContext) -> Result<()> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, input: Receiver<T>, output: Sender<T>, ctx: &RunContext) -> Result<()> {
        (self.f)(input, output, ctx)
    }
}

/// Boxed stage list as accepted by [`run_pipeline`](super::run_pipeline).
pub type Stages<T> = Vec<Box<dyn Stage<T>>>;
