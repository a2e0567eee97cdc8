//! sigpipe CLI: sign values through the concurrent pipeline and print the combined signature.

use anyhow::Result;
use clap::Parser;
use sigpipe::engine::arg_parser::Cli;
use sigpipe::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    // A missing .env is fine; it only supplies RUST_LOG / SIGPIPE_* overrides.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
