//! Load `.sigpipe.toml` (CLI only). Lib callers pass settings through `SignOpts` / `Opts` instead.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{FailurePolicy, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct SigpipeToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    max_in_flight: Option<usize>,
    channel_cap: Option<usize>,
    keep_going: Option<bool>,
    crc_delay_ms: Option<u64>,
    md5_delay_ms: Option<u64>,
    verbose: Option<bool>,
}

pub fn parse_sigpipe_toml(s: &str) -> Result<SigpipeToml> {
    toml::from_str(s).context("parse sigpipe config")
}

/// Load a config file. `Ok(None)` when the file does not exist.
pub fn load_sigpipe_toml(path: &Path) -> Result<Option<SigpipeToml>> {
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_sigpipe_toml(&s)
        .with_context(|| path.display().to_string())
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($set:expr, $opts:expr, $set_field:ident => $opts_field:ident) => {
        if let Some(v) = $set.$set_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &SigpipeToml, opts: &mut Opts) {
    let set = &file.settings;
    apply_file_opt!(set, opts, max_in_flight => max_in_flight);
    apply_file_opt!(set, opts, channel_cap => channel_cap);
    apply_file_opt!(set, opts, verbose => verbose);
    if let Some(keep_going) = set.keep_going {
        opts.failure_policy = policy_for(keep_going);
    }
    if let Some(ms) = set.crc_delay_ms {
        opts.crc_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = set.md5_delay_ms {
        opts.md5_delay = Duration::from_millis(ms);
    }
}

pub fn policy_for(keep_going: bool) -> FailurePolicy {
    if keep_going {
        FailurePolicy::Sentinel
    } else {
        FailurePolicy::Abort
    }
}
