//! Splitting a batch into contiguous per-worker ranges.

use std::ops::Range;

/// Number of workers for a batch: the requested count capped by the
/// hardware concurrency, or the hardware concurrency when nothing is
/// requested. Never less than one.
pub fn effective_threads(hardware: usize, requested: Option<usize>) -> usize {
    let hardware = hardware.max(1);
    requested.map_or(hardware, |r| r.min(hardware)).max(1)
}

/// Contiguous ranges of `samples` items over `threads` workers.
///
/// Every worker gets `block_size` items and the last one also takes the
/// remainder. With at least as many workers as items the first worker takes
/// everything and the others get empty ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    samples: usize,
    threads: usize,
    block_size: usize,
}

impl Partition {
    pub fn new(samples: usize, threads: usize) -> Self {
        let threads = threads.max(1);
        let block_size = if threads >= samples {
            samples
        } else {
            samples / threads
        };
        Self {
            samples,
            threads,
            block_size,
        }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Items added to the last range on top of `block_size`.
    pub fn remainder(&self) -> usize {
        if self.threads >= self.samples {
            0
        } else {
            self.samples % self.threads
        }
    }

    /// Range of worker `worker`.
    pub fn range(&self, worker: usize) -> Range<usize> {
        let start = (worker * self.block_size).min(self.samples);
        let end = if worker + 1 == self.threads {
            self.samples
        } else {
            ((worker + 1) * self.block_size).min(self.samples)
        };
        start..end.max(start)
    }

    /// All ranges in worker order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.threads).map(move |worker| self.range(worker))
    }
}
