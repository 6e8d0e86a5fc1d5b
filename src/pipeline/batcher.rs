//! Fixed-size, order-preserving batching

use super::normalizer::NormalizedRecord;
use std::num::NonZeroUsize;

/// Default number of entries per remote request
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A contiguous group of normalized records sent in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position of the batch in the run
    pub index: usize,
    pub records: Vec<NormalizedRecord>,
}

impl Batch {
    /// 1-based batch number, as shown to users
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }
}

/// Splits `records` into batches of `size`; only the last may be shorter.
pub fn into_batches(records: Vec<NormalizedRecord>, size: NonZeroUsize) -> Vec<Batch> {
    let size = size.get();
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut iter = records.into_iter().peekable();

    while iter.peek().is_some() {
        let chunk: Vec<NormalizedRecord> = iter.by_ref().take(size).collect();
        batches.push(Batch {
            index: batches.len(),
            records: chunk,
        });
    }

    batches
}
