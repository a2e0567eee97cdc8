use clap::Parser;
use std::path::PathBuf;

/// Concurrent signing pipeline: single hash → multi hash → combine.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "sigpipe")]
#[command(about = "Sign values through a concurrent pipeline and print the combined signature.")]
pub struct Cli {
    /// Values to sign. Default: `--count 7`.
    #[arg(value_name = "VALUES")]
    pub values: Vec<String>,

    /// Sign the integers 0..N instead of positional values.
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Read values from a file, one per line (blank lines skipped).
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Config file. Default: `.sigpipe.toml` in the current directory, if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Max items each stage works on at once.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub max_in_flight: Option<usize>,

    /// Capacity of the channels between stages (0 = rendezvous).
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub channel_cap: Option<usize>,

    /// Replace failed items with a sentinel instead of aborting the run.
    #[arg(long, short = 'k', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub keep_going: Option<bool>,

    /// Use the slow-service latency presets for both primitives.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub simulate_latency: Option<bool>,

    /// Simulated latency per checksum call, in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub crc_delay_ms: Option<u64>,

    /// Simulated latency per digest call, in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub md5_delay_ms: Option<u64>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
