//! Public and internal types for the sigpipe API and pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::utils::config::PipelineDefaults;

/// What a stage does when the work for one item fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the first failure, cancel the run, and return the failure from the executor.
    #[default]
    Abort,
    /// Emit [`ERROR_SENTINEL`](crate::utils::config::ERROR_SENTINEL) for the failed item and keep going.
    Sentinel,
}

/// Lib-only options for [`sign_values`](crate::sign_values). Only the fields that apply when using the crate.
#[derive(Clone, Debug, Default)]
pub struct SignOpts {
    /// Max items processed concurrently per stage. When None, derived from the rayon pool size.
    pub max_in_flight: Option<usize>,
    /// Capacity of the channels between stages. When None, uses the default cap.
    pub channel_cap: Option<usize>,
    /// Abort on the first failed item, or substitute a sentinel and continue.
    pub failure_policy: FailurePolicy,
    /// Simulated latency added to every checksum call.
    pub crc_delay: Duration,
    /// Simulated latency added to every digest call.
    pub md5_delay: Duration,
}

impl From<&SignOpts> for Opts {
    fn from(o: &SignOpts) -> Self {
        Opts {
            config_path: None,
            max_in_flight: o.max_in_flight.unwrap_or_else(PipelineDefaults::max_in_flight),
            channel_cap: o.channel_cap.unwrap_or(PipelineDefaults::CHANNEL_CAP),
            failure_policy: o.failure_policy,
            crc_delay: o.crc_delay,
            md5_delay: o.md5_delay,
            verbose: false,
        }
    }
}

/// Full options (CLI and lib). Use [`SignOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Config file the CLI loaded settings from, if any.
    pub config_path: Option<PathBuf>,
    /// Max items processed concurrently per stage. Must be at least 1.
    pub max_in_flight: usize,
    /// Capacity of the channels between stages. 0 means rendezvous channels.
    pub channel_cap: usize,
    /// Abort on the first failed item, or substitute a sentinel and continue.
    pub failure_policy: FailurePolicy,
    /// Simulated latency added to every checksum call.
    pub crc_delay: Duration,
    /// Simulated latency added to every digest call.
    pub md5_delay: Duration,
    /// Show a progress counter and debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Opts::from(&SignOpts::default())
    }
}
