//! Per-item workers shared by the signing stages: one scoped thread per inbound item, bounded by
//! the run's in-flight limit.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread;

use crate::pipeline::{InFlightLimiter, RunContext};
use crate::utils::config::ERROR_SENTINEL;

/// Run `sign` for every item on `input` concurrently and send each result on `output`.
///
/// Returns once `input` is closed (or the run is cancelled) and every worker has finished, so the
/// caller dropping `output` afterwards closes the channel. Failed items follow the run's
/// [`FailurePolicy`](crate::FailurePolicy): sentinel and continue, or drop the item and abort.
/// An inbound sentinel is forwarded as is, so a failure stays visible in the final signature.
pub fn sign_each<F>(
    stage: &str,
    input: Receiver<String>,
    output: Sender<String>,
    ctx: &RunContext,
    sign: F,
) -> Result<()>
where
    F: Fn(&str) -> Result<String> + Sync,
{
    let limiter = InFlightLimiter::new(ctx.max_in_flight);
    let mut received = 0_usize;

    thread::scope(|s| -> Result<()> {
        for item in input.iter() {
            if ctx.is_cancelled() {
                debug!("{}: cancelled, not spawning more items", stage);
                break;
            }
            received += 1;
            let permit = limiter.acquire();
            let output = output.clone();
            let sign = &sign;
            thread::Builder::new()
                .name(format!("{}-item", stage))
                .spawn_scoped(s, move || {
                    let _permit = permit;
                    if ctx.is_cancelled() {
                        return;
                    }
                    if item == ERROR_SENTINEL {
                        let _ = output.send(item);
                        return;
                    }
                    let result = match sign(&item) {
                        Ok(sig) => sig,
                        Err(e) if ctx.record_item_failure(stage, &item, &e) => {
                            ERROR_SENTINEL.to_string()
                        }
                        Err(_) => return,
                    };
                    // Downstream gone means the run is stopping; nothing left to do with it.
                    let _ = output.send(result);
                })
                .with_context(|| format!("{}: spawn item worker", stage))?;
        }
        Ok(())
    })?;

    debug!("{}: {} items received", stage, received);
    Ok(())
}
