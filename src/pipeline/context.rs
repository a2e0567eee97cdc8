//! Run context shared by every stage thread, plus cancellation and the per-stage in-flight limit.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::error_handler::PipelineError;
use crate::{FailurePolicy, Opts};

/// Cooperative cancellation flag. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Shared state for one pipeline run. Built per run and handed to every stage as `&RunContext`.
#[derive(Debug)]
pub struct RunContext {
    /// Max items one stage works on at the same time.
    pub max_in_flight: usize,
    /// Capacity of each channel between stages.
    pub channel_cap: usize,
    pub failure_policy: FailurePolicy,
    pub cancel: CancelToken,
    /// Items replaced by the sentinel under [`FailurePolicy::Sentinel`].
    pub failed_items: AtomicUsize,
    first_error: Mutex<Option<PipelineError>>,
}

impl RunContext {
    pub fn new(opts: &Opts) -> Self {
        Self::with_cancel(opts, CancelToken::new())
    }

    /// Use an existing token, e.g. one a Ctrl+C handler already holds.
    pub fn with_cancel(opts: &Opts, cancel: CancelToken) -> Self {
        Self {
            max_in_flight: opts.max_in_flight,
            channel_cap: opts.channel_cap,
            failure_policy: opts.failure_policy,
            cancel,
            failed_items: AtomicUsize::new(0),
            first_error: Mutex::new(None),
        }
    }

    /// Reject settings that cannot run. Called before any thread is spawned.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_in_flight == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Record a failed item. Returns true when the caller should emit the sentinel and continue,
    /// false when the run is aborting and the item should be dropped.
    pub fn record_item_failure(&self, stage: &str, item: &str, err: &anyhow::Error) -> bool {
        match self.failure_policy {
            FailurePolicy::Sentinel => {
                self.failed_items.fetch_add(1, Ordering::Relaxed);
                warn!("{}: item {:?} failed: {:#}", stage, item, err);
                true
            }
            FailurePolicy::Abort => {
                self.record_error(PipelineError::ItemFailed {
                    stage: stage.to_string(),
                    item: item.to_string(),
                    reason: format!("{:#}", err),
                });
                false
            }
        }
    }

    /// Keep the first error of the run and cancel everything still in flight.
    pub fn record_error(&self, err: PipelineError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            debug!("first error: {}; cancelling run", err);
            *slot = Some(err);
        }
        self.cancel.cancel();
    }

    pub fn take_first_error(&self) -> Option<PipelineError> {
        self.first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Counting semaphore over a pre-filled bounded channel: one token per item allowed in flight.
pub struct InFlightLimiter {
    token_tx: Sender<()>,
    token_rx: Receiver<()>,
}

/// Returned by [`InFlightLimiter::acquire`]; hands the token back when dropped.
pub struct InFlightPermit {
    token_tx: Sender<()>,
}

impl InFlightLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        let cap = max_in_flight.max(1);
        let (token_tx, token_rx) = bounded(cap);
        for _ in 0..cap {
            let _ = token_tx.send(());
        }
        Self { token_tx, token_rx }
    }

    /// Block until an item slot is free.
    pub fn acquire(&self) -> InFlightPermit {
        // The limiter holds a sender, so the channel never disconnects while `self` is alive.
        let _ = self.token_rx.recv();
        InFlightPermit {
            token_tx: self.token_tx.clone(),
        }
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.token_rx.len()
    }
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        let _ = self.token_tx.send(());
    }
}
