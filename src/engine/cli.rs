//! CLI command handler: build opts (file → env → flags), run the signing pipeline, print the result.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::hashing::StdSigner;
use crate::engine::progress::setup_progress;
use crate::engine::source::Source;
use crate::engine::workload::execute_signing;
use crate::pipeline::{CancelToken, RunContext};
use crate::utils::config::{LatencyConsts, PackagePaths};
use crate::utils::{apply_file_to_opts, load_sigpipe_toml, policy_for, setup_logging};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(v) = $cli.$cli_field {
            $opts.$opts_field = v;
        }
    };
}

/// Read `SIGPIPE_MAX_IN_FLIGHT`; ignored with a warning when it is not a number.
fn apply_env_to_opts(opts: &mut Opts) {
    let key = PackagePaths::get().env_var("MAX_IN_FLIGHT");
    if let Ok(raw) = std::env::var(&key) {
        match raw.trim().parse::<usize>() {
            Ok(n) => opts.max_in_flight = n,
            Err(e) => warn!("{}={:?} ignored: {}", key, raw, e),
        }
    }
}

/// Build run options: defaults, then config file, then environment, then CLI flags.
pub fn build_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();

    let (config_path, explicit) = match &cli.config {
        Some(p) => (p.clone(), true),
        None => (PathBuf::from(PackagePaths::get().config_filename()), false),
    };
    match load_sigpipe_toml(&config_path)? {
        Some(file) => {
            apply_file_to_opts(&file, &mut opts);
            opts.config_path = Some(config_path);
        }
        None if explicit => {
            anyhow::bail!("config file {} not found", config_path.display());
        }
        None => {}
    }

    apply_env_to_opts(&mut opts);

    if cli.simulate_latency == Some(true) {
        opts.crc_delay = Duration::from_millis(LatencyConsts::CRC_DELAY_MS);
        opts.md5_delay = Duration::from_millis(LatencyConsts::MD5_DELAY_MS);
    }
    apply_cli_opt!(cli, opts, max_in_flight => max_in_flight);
    apply_cli_opt!(cli, opts, channel_cap => channel_cap);
    apply_cli_opt!(cli, opts, verbose => verbose);
    if let Some(keep_going) = cli.keep_going {
        opts.failure_policy = policy_for(keep_going);
    }
    if let Some(ms) = cli.crc_delay_ms {
        opts.crc_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.md5_delay_ms {
        opts.md5_delay = Duration::from_millis(ms);
    }
    Ok(opts)
}

/// Sign the CLI's items and print the combined signature to stdout.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(cli)?;
    setup_logging(opts.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        opts
    );

    let items = Source::from_cli(cli)?.into_items()?;

    let cancel = CancelToken::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || {
        cancel_handler.cancel();
    })
    .context("set Ctrl+C handler")?;

    let ctx = Arc::new(RunContext::with_cancel(&opts, cancel));
    let signer = Arc::new(StdSigner::from_opts(&opts));
    let bar = setup_progress(opts.verbose);

    let result = execute_signing(signer, items, &ctx, bar.clone());
    if bar.is_some() {
        eprintln!();
    }
    let combined = result.context("signing pipeline failed")?;
    println!("{}", combined);
    Ok(())
}
