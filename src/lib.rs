//! sigpipe: concurrent multi-stage pipeline executor with a deterministic signing workload

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::sync::Arc;

/// Result alias used by public sigpipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: sign `values` with the standard primitives and return the combined signature.
///
/// Runs single hash → multi hash → combine with the settings in `opts`. The result does not depend
/// on scheduling: running it twice on the same values gives the same string. No values gives `""`.
///
/// ```ignore
/// let sig = sigpipe::sign_values(["0", "1"].map(String::from), &SignOpts::default())?;
/// ```
pub fn sign_values<I>(values: I, opts: &SignOpts) -> Result<String>
where
    I: IntoIterator<Item = String>,
    I::IntoIter: Send + 'static,
{
    let opts = Opts::from(opts);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    let ctx = Arc::new(pipeline::RunContext::new(&opts));
    let signer = Arc::new(engine::StdSigner::from_opts(&opts));
    engine::execute_signing(signer, values, &ctx, None)
}
