//! Terminal reducer: sort everything received and join it into one string.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::debug;

use super::progress::{ProgressBar, update_progress_bar};
use crate::pipeline::{RunContext, Stage};
use crate::utils::config::COMBINE_SEPARATOR;

/// Sort ascending (byte order) and join with `_`. No results gives `""`.
pub fn combine_results(mut results: Vec<String>) -> String {
    results.sort_unstable();
    results.join(COMBINE_SEPARATOR)
}

/// Collects the whole stream, then emits exactly one combined item.
#[derive(Default)]
pub struct CombineResults {
    progress: Option<ProgressBar>,
}

impl CombineResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick `bar` once per collected result.
    pub fn with_progress(bar: Option<ProgressBar>) -> Self {
        Self { progress: bar }
    }
}

impl Stage<String> for CombineResults {
    fn name(&self) -> &str {
        "combine_results"
    }

    fn run(
        &mut self,
        input: Receiver<String>,
        output: Sender<String>,
        _ctx: &RunContext,
    ) -> Result<()> {
        let mut results = Vec::new();
        for item in input.iter() {
            results.push(item);
            if let Some(bar) = &self.progress {
                update_progress_bar(bar, 1);
            }
        }
        debug!("{}: combining {} results", self.name(), results.len());
        let _ = output.send(combine_results(results));
        Ok(())
    }
}
