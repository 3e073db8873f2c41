// batcher.rs - request size limiter

/// Blocks per append request accepted by Notion
pub const NOTION_MAX_BATCH: usize = 100;

pub const DEFAULT_BATCH_SIZE: usize = NOTION_MAX_BATCH;

pub struct Batcher {
    pub batch_size: usize,
}

impl Batcher {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Contiguous, in-order slices of at most `batch_size` items; only the
    /// last one may be shorter.
    ///
    /// # Panics
    /// If `batch_size` is zero. Item configuration rejects that before a
    /// batcher is built.
    pub fn split<'a, T>(&self, items: &'a [T]) -> Vec<&'a [T]> {
        items.chunks(self.batch_size).collect()
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
