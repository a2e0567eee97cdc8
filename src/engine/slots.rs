//! Fixed-size, write-once slots for collecting parallel results in index order.

use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("slot {0} written twice")]
    AlreadyFilled(usize),
    #[error("slot {0} never written")]
    Missing(usize),
}

/// `len` pre-sized slots addressed by task index. Each slot is written at most once, from any
/// thread; the values are read back in index order after all writers have joined.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<OnceLock<T>>,
}

impl<T> SlotArena<T> {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn fill(&self, index: usize, value: T) -> Result<(), SlotError> {
        let slot = self.slots.get(index).ok_or(SlotError::OutOfRange {
            index,
            len: self.slots.len(),
        })?;
        slot.set(value).map_err(|_| SlotError::AlreadyFilled(index))
    }

    /// Values in index order. Fails on the first slot nobody wrote.
    pub fn into_ordered(self) -> Result<Vec<T>, SlotError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.into_inner().ok_or(SlotError::Missing(i)))
            .collect()
    }
}
