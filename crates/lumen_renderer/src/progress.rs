//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Called with `(pixels_done, pixels_total)`.
pub type ProgressCallback = dyn Fn(usize, usize) + Send + Sync;

/// Shared flag that stops a render at the next row boundary.
///
/// Clones share the flag. It stays set until [`CancelToken::reset`].
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Pixel counter shared by all workers of one render.
///
/// Reports roughly every 1% of `total` and always once on completion.
/// Each value is reported at most once, but callbacks run on whichever
/// worker crossed the threshold, so they may arrive out of order. No lock
/// is held during a callback.
pub(crate) struct Progress<'a> {
    done: AtomicUsize,
    last_reported: AtomicUsize,
    total: usize,
    step: usize,
    callback: Option<&'a (dyn Fn(usize, usize) + Send + Sync + 'a)>,
}

impl<'a> Progress<'a> {
    pub(crate) fn new(
        total: usize,
        callback: Option<&'a (dyn Fn(usize, usize) + Send + Sync + 'a)>,
    ) -> Self {
        Self {
            done: AtomicUsize::new(0),
            last_reported: AtomicUsize::new(0),
            total,
            step: (total / 100).max(1),
            callback,
        }
    }

    /// Record `pixels` more finished pixels.
    pub(crate) fn advance(&self, pixels: usize) {
        let current = self.done.fetch_add(pixels, Ordering::Relaxed) + pixels;
        let Some(callback) = self.callback else {
            return;
        };

        let last = self.last_reported.load(Ordering::Relaxed);
        if current - last.min(current) < self.step && current != self.total {
            return;
        }
        let prev = self.last_reported.fetch_max(current, Ordering::Relaxed);
        if current > prev {
            callback(current, self.total);
        }
    }

    pub(crate) fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}
