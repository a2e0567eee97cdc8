pub mod config;
pub mod logger;
pub mod sigpipe_toml;

pub use config::*;
pub use logger::setup_logging;
pub use sigpipe_toml::{apply_file_to_opts, load_sigpipe_toml, parse_sigpipe_toml, policy_for};
