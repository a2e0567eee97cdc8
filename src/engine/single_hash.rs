//! Single-hash stage: `CRC(data) ~ CRC(DIGEST(data))` per item.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

use super::digest_lock::DigestLock;
use super::hashing::{Signer, crc32_of_md5};
use super::item_workers::sign_each;
use crate::pipeline::{RunContext, Stage};
use crate::utils::config::SINGLE_HASH_SEPARATOR;

/// Sign one item. The digest checksum runs on its own scoped thread while the plain checksum runs
/// on the caller's; only the digest call itself holds `lock`.
pub fn single_hash<S: Signer + ?Sized>(signer: &S, lock: &DigestLock, data: &str) -> Result<String> {
    thread::scope(|s| -> Result<String> {
        let from_digest = s.spawn(|| crc32_of_md5(signer, lock, data));
        let plain = signer.crc32(data);
        let from_digest = from_digest
            .join()
            .map_err(|_| anyhow!("digest task panicked for {:?}", data))?;
        Ok(format!("{}{}{}", plain?, SINGLE_HASH_SEPARATOR, from_digest?))
    })
}

pub struct SingleHash<S: ?Sized> {
    signer: Arc<S>,
    lock: Arc<DigestLock>,
}

impl<S: Signer + ?Sized> SingleHash<S> {
    /// Every stage sharing a signer should share one `lock`.
    pub fn new(signer: Arc<S>, lock: Arc<DigestLock>) -> Self {
        Self { signer, lock }
    }
}

impl<S: Signer + ?Sized + 'static> Stage<String> for SingleHash<S> {
    fn name(&self) -> &str {
        "single_hash"
    }

    fn run(
        &mut self,
        input: Receiver<String>,
        output: Sender<String>,
        ctx: &RunContext,
    ) -> Result<()> {
        let signer = &*self.signer;
        let lock = &*self.lock;
        sign_each(self.name(), input, output, ctx, |data| {
            single_hash(signer, lock, data)
        })
    }
}
