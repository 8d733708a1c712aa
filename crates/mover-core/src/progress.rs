//! Progress bookkeeping for a transfer.

/// Messages moved so far against the total shown to the user.
///
/// The total starts at the queue's approximate message count and only ever
/// grows: once more messages have been moved than the estimate promised, the
/// total follows the moved count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct TransferProgress {
    moved: u64,
    total: u64,
}

impl TransferProgress {
    pub fn new(approximate_total: u64) -> Self {
        Self {
            moved: 0,
            total: approximate_total,
        }
    }

    /// Counts a batch that was both forwarded and deleted.
    pub fn record(&mut self, batch_len: usize) {
        self.moved += batch_len as u64;
        if self.moved > self.total {
            self.total = self.moved;
        }
    }

    pub fn moved(&self) -> u64 {
        self.moved
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Receives progress updates from a running transfer.
pub trait Progress {
    fn report(&mut self, moved: u64, total: u64);
}

/// Discards progress updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Progress for Silent {
    fn report(&mut self, _moved: u64, _total: u64) {}
}
