//! Exclusive access to the digest primitive.
//!
//! [`Signer::md5`](super::hashing::Signer::md5) takes a [`DigestPermit`], and the only way to get one
//! is [`DigestLock::with_permit`]. Calling the digest without holding the lock does not compile.

use log::trace;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared lock guarding every digest call. Clone the `Arc` around it into each stage that digests.
#[derive(Debug, Default)]
pub struct DigestLock {
    inner: Mutex<()>,
}

/// Proof that the caller holds the [`DigestLock`]. Lives only for the closure passed to
/// [`DigestLock::with_permit`].
pub struct DigestPermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl DigestLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock. The lock is released when `f` returns or unwinds.
    ///
    /// Keep `f` to the digest call alone; anything else done inside is serialized with every
    /// other digest in the run.
    pub fn with_permit<R>(&self, f: impl FnOnce(&DigestPermit<'_>) -> R) -> R {
        // The guarded value is `()`, so a panic in a previous holder leaves nothing inconsistent.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("digest lock acquired");
        let permit = DigestPermit { _guard: guard };
        f(&permit)
    }
}
