//! Result budget shared by every crawl worker.

use std::sync::atomic::{AtomicUsize, Ordering};

/// How many records a run may emit and how many listing pages it may walk.
///
/// `saved` only moves through [`CrawlBudget::try_reserve`] and
/// [`CrawlBudget::release`], so concurrent workers can never push past
/// `results_wanted`.
#[derive(Debug)]
pub struct CrawlBudget {
    results_wanted: Option<usize>,
    max_pages: u32,
    saved: AtomicUsize,
}

impl CrawlBudget {
    /// `results_wanted` of `None` means unbounded; pagination still stops
    /// at `max_pages`.
    pub fn new(results_wanted: Option<usize>, max_pages: u32) -> Self {
        Self {
            results_wanted,
            max_pages: max_pages.max(1),
            saved: AtomicUsize::new(0),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }

    /// Slots left before the budget is exhausted.
    pub fn remaining(&self) -> usize {
        match self.results_wanted {
            Some(wanted) => wanted.saturating_sub(self.saved()),
            None => usize::MAX,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Whether a listing page numbered `page` may link to another.
    pub fn allows_page_after(&self, page: u32) -> bool {
        !self.is_exhausted() && page < self.max_pages
    }

    /// Claim up to `wanted` slots, returning how many were granted.
    pub fn try_reserve(&self, wanted: usize) -> usize {
        if wanted == 0 {
            return 0;
        }
        let mut current = self.saved.load(Ordering::SeqCst);
        loop {
            let granted = match self.results_wanted {
                Some(limit) => wanted.min(limit.saturating_sub(current)),
                None => wanted,
            };
            if granted == 0 {
                return 0;
            }
            match self.saved.compare_exchange_weak(
                current,
                current + granted,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return granted,
                Err(actual) => current = actual,
            }
        }
    }

    /// Give back slots whose records were never emitted.
    pub fn release(&self, count: usize) {
        if count == 0 {
            return;
        }
        let _ = self
            .saved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(count))
            });
    }
}
