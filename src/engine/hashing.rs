//! Hash primitives: the checksum and the lock-guarded digest.

use anyhow::Result;
use crc32fast::Hasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::digest_lock::{DigestLock, DigestPermit};
use crate::Opts;
use crate::pipeline::PipelineError;

/// The two primitives the signing stages are built from.
///
/// `crc32` may be called from any number of threads at once. `md5` requires a [`DigestPermit`],
/// so every call is serialized through a [`DigestLock`].
pub trait Signer: Send + Sync {
    /// Checksum of `data`.
    fn crc32(&self, data: &str) -> Result<String>;

    /// Digest of `data`. Only callable while the digest lock is held.
    fn md5(&self, data: &str, permit: &DigestPermit<'_>) -> Result<String>;
}

/// `CRC(DIGEST(data))`, holding `lock` for the digest call only.
pub fn crc32_of_md5<S: Signer + ?Sized>(signer: &S, lock: &DigestLock, data: &str) -> Result<String> {
    let digest = lock.with_permit(|permit| signer.md5(data, permit))?;
    signer.crc32(&digest)
}

/// Production primitives: CRC-32 (IEEE) as an unsigned decimal, MD5 as lowercase hex.
///
/// Each primitive can be slowed down to model a remote service. The digest also counts overlapping
/// calls and fails with [`PipelineError::DigestContention`] if it ever sees one.
#[derive(Debug, Default)]
pub struct StdSigner {
    crc_delay: Duration,
    md5_delay: Duration,
    md5_in_flight: AtomicUsize,
}

impl StdSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(crc_delay: Duration, md5_delay: Duration) -> Self {
        Self {
            crc_delay,
            md5_delay,
            md5_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn from_opts(opts: &Opts) -> Self {
        Self::with_latency(opts.crc_delay, opts.md5_delay)
    }
}

impl Signer for StdSigner {
    fn crc32(&self, data: &str) -> Result<String> {
        let mut hasher = Hasher::new();
        hasher.update(data.as_bytes());
        let sum = hasher.finalize();
        if !self.crc_delay.is_zero() {
            thread::sleep(self.crc_delay);
        }
        Ok(sum.to_string())
    }

    fn md5(&self, data: &str, _permit: &DigestPermit<'_>) -> Result<String> {
        let overlapping = self.md5_in_flight.fetch_add(1, Ordering::SeqCst);
        let _exit = InFlightExit(&self.md5_in_flight);
        if overlapping > 0 {
            return Err(PipelineError::DigestContention.into());
        }
        let digest = md5::compute(data.as_bytes());
        if !self.md5_delay.is_zero() {
            thread::sleep(self.md5_delay);
        }
        Ok(format!("{:x}", digest))
    }
}

/// Decrements the digest in-flight counter on every exit path.
struct InFlightExit<'a>(&'a AtomicUsize);

impl Drop for InFlightExit<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
