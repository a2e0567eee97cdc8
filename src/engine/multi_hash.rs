//! Multi-hash stage: six indexed checksums per item, concatenated in index order.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

use super::hashing::Signer;
use super::item_workers::sign_each;
use super::slots::SlotArena;
use crate::pipeline::{RunContext, Stage};
use crate::utils::config::MULTI_HASH_WIDTH;

/// `CRC("0" + data) + CRC("1" + data) + … + CRC("5" + data)`.
///
/// The six checksums run on scoped threads (the checksum may block), each writing its own slot;
/// the slots are read in index order after the scope joins, so completion order never affects
/// the result.
pub fn multi_hash<S: Signer + ?Sized>(signer: &S, data: &str) -> Result<String> {
    let slots: SlotArena<Result<String>> = SlotArena::new(MULTI_HASH_WIDTH);
    thread::scope(|s| {
        for idx in 0..MULTI_HASH_WIDTH {
            let slots = &slots;
            s.spawn(move || {
                let part = signer.crc32(&format!("{}{}", idx, data));
                // Indices are distinct, so each slot is filled exactly once.
                let _ = slots.fill(idx, part);
            });
        }
    });

    let mut sig = String::new();
    for part in slots.into_ordered()? {
        sig.push_str(&part?);
    }
    Ok(sig)
}

pub struct MultiHash<S: ?Sized> {
    signer: Arc<S>,
}

impl<S: Signer + ?Sized> MultiHash<S> {
    pub fn new(signer: Arc<S>) -> Self {
        Self { signer }
    }
}

impl<S: Signer + ?Sized + 'static> Stage<String> for MultiHash<S> {
    fn name(&self) -> &str {
        "multi_hash"
    }

    fn run(
        &mut self,
        input: Receiver<String>,
        output: Sender<String>,
        ctx: &RunContext,
    ) -> Result<()> {
        let signer = &*self.signer;
        sign_each(self.name(), input, output, ctx, |data| multi_hash(signer, data))
    }
}
