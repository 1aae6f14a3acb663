use std::mem;

use crate::ingest::pipeline::document::{Chunk, IndexBatch};

/// Cuts the chunk sequence into batches of `batch_size`, numbered from zero.
///
/// Boundaries depend only on the chunk order and the batch size, so a rerun
/// over the same articles reproduces the same batches.
pub(crate) struct Batcher {
    batch_size: usize,
    next_index: usize,
    pending: Vec<Chunk>,
}

impl Batcher {
    pub(crate) fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            next_index: 0,
            pending: Vec::with_capacity(batch_size),
        }
    }

    pub(crate) fn push(&mut self, chunk: Chunk) -> Option<IndexBatch> {
        self.pending.push(chunk);
        if self.pending.len() >= self.batch_size {
            Some(self.emit())
        } else {
            None
        }
    }

    /// The trailing, possibly short, batch.
    pub(crate) fn finish(mut self) -> Option<IndexBatch> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.emit())
        }
    }

    fn emit(&mut self) -> IndexBatch {
        let chunks = mem::replace(&mut self.pending, Vec::with_capacity(self.batch_size));
        let batch = IndexBatch {
            index: self.next_index,
            chunks,
        };
        self.next_index += 1;
        batch
    }
}
