//! Work queue shared by crawl workers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::models::CrawlRequest;

/// FIFO of pending requests that knows when the crawl is finished.
///
/// A request counts as outstanding from [`Frontier::push`] until the worker
/// that took it calls [`Frontier::complete`]. Workers block in
/// [`Frontier::next`] while other requests are outstanding, since those may
/// still enqueue more work, and get `None` once nothing is left.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CrawlRequest>>,
    outstanding: AtomicUsize,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, request: CrawlRequest) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().await.push_back(request);
        self.changed.notify_waiters();
    }

    /// Take the next request, waiting while other workers may still add some.
    pub async fn next(&self) -> Option<CrawlRequest> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(request) = self.queue.lock().await.pop_front() {
                return Some(request);
            }
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return None;
            }
            notified.await;
        }
    }

    /// Mark one request taken from [`Frontier::next`] as fully handled.
    pub fn complete(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.changed.notify_waiters();
        }
    }

    /// Guard that calls [`Frontier::complete`] when dropped, so a request
    /// is released even if its handler unwinds.
    pub fn completion(&self) -> Completion<'_> {
        Completion { frontier: self }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// See [`Frontier::completion`].
pub struct Completion<'a> {
    frontier: &'a Frontier,
}

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
