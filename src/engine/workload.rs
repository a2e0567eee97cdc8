//! The signing workload: single hash → multi hash → combine.

use anyhow::{Result, anyhow};
use std::sync::Arc;

use super::combine::CombineResults;
use super::digest_lock::DigestLock;
use super::hashing::Signer;
use super::multi_hash::MultiHash;
use super::progress::ProgressBar;
use super::single_hash::SingleHash;
use crate::pipeline::{RunContext, Stage, Stages, run_pipeline};

/// The three signing stages, wired to share `signer` and `lock`.
pub fn signing_stages<S>(
    signer: Arc<S>,
    lock: Arc<DigestLock>,
    progress: Option<ProgressBar>,
) -> Stages<String>
where
    S: Signer + ?Sized + 'static,
{
    let single: Box<dyn Stage<String>> = Box::new(SingleHash::new(Arc::clone(&signer), lock));
    let multi: Box<dyn Stage<String>> = Box::new(MultiHash::new(signer));
    let combine: Box<dyn Stage<String>> = Box::new(CombineResults::with_progress(progress));
    vec![single, multi, combine]
}

/// Run the signing workload over `values` and return the combined signature.
///
/// The digest lock is created here, so it covers every digest call of this run. Callers running
/// several pipelines against one rate-limited service should use [`signing_stages`] with a shared
/// lock instead.
pub fn execute_signing<S, I>(
    signer: Arc<S>,
    values: I,
    ctx: &Arc<RunContext>,
    progress: Option<ProgressBar>,
) -> Result<String>
where
    S: Signer + ?Sized + 'static,
    I: IntoIterator<Item = String>,
    I::IntoIter: Send + 'static,
{
    let lock = Arc::new(DigestLock::new());
    let mut outputs = run_pipeline(signing_stages(signer, lock, progress), values, ctx)?;
    if outputs.len() != 1 {
        return Err(anyhow!(
            "combine stage emitted {} results, expected 1",
            outputs.len()
        ));
    }
    outputs
        .pop()
        .ok_or_else(|| anyhow!("combine stage emitted no result"))
}
