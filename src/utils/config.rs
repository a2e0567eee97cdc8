//! Application configuration constants.
//! Tuning and defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable name for `key`, e.g. `SIGPIPE_MAX_IN_FLIGHT`.
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key)
    }
}

// ---- Pipeline ----

/// Defaults for the executor and per-stage concurrency.
pub struct PipelineDefaults;

impl PipelineDefaults {
    /// Channel capacity between stages.
    pub const CHANNEL_CAP: usize = 1_024;
    /// In-flight items per rayon thread when no explicit limit is given.
    pub const IN_FLIGHT_PER_THREAD: usize = 4;
    /// Lower bound for the derived in-flight limit.
    pub const MIN_IN_FLIGHT: usize = 2;
    /// Number of items generated by the CLI when no source is given.
    pub const DEFAULT_COUNT: usize = 7;

    /// Per-stage in-flight limit derived from the rayon pool size.
    pub fn max_in_flight() -> usize {
        (rayon::current_num_threads() * Self::IN_FLIGHT_PER_THREAD).max(Self::MIN_IN_FLIGHT)
    }
}

// ---- Signing workload ----

/// Separator between the plain checksum and the digest checksum in a single-hash result.
pub const SINGLE_HASH_SEPARATOR: &str = "~";

/// Number of indexed checksums computed per item by the multi-hash stage.
pub const MULTI_HASH_WIDTH: usize = 6;

/// Separator used by the reducer when joining sorted results.
pub const COMBINE_SEPARATOR: &str = "_";

/// Emitted in place of a result when an item fails under the sentinel policy.
pub const ERROR_SENTINEL: &str = "!error";

// ---- Simulated latency ----

/// Latency presets for `--simulate-latency`, modelled on a slow remote signing service.
pub struct LatencyConsts;

impl LatencyConsts {
    /// Checksum call latency in milliseconds.
    pub const CRC_DELAY_MS: u64 = 1_000;
    /// Digest call latency in milliseconds.
    pub const MD5_DELAY_MS: u64 = 10;
}
