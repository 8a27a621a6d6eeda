//! Progress reporting for batch runs.
//!
//! The orchestrator calls [`ProgressReporter::advance`] exactly once per
//! finished unit of work, from many concurrent units. Diagnostic events go
//! through [`ProgressReporter::report`], which is a no-op by default.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::FailureKind;

/// Events emitted by the batch orchestrator for monitoring/logging.
#[derive(Debug, Clone)]
pub enum BatchEvent<'a> {
    Started {
        total: usize,
    },
    UnitCompleted {
        code: &'a str,
        characteristics: usize,
    },
    UnitSkipped {
        code: &'a str,
        kind: FailureKind,
        reason: &'a str,
    },
    Finished {
        succeeded: usize,
        skipped: usize,
    },
}

/// Sink for batch progress.
pub trait ProgressReporter: Send + Sync {
    /// One more unit of work finished, successfully or not.
    fn advance(&self);

    fn report(&self, event: BatchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn advance(&self) {}
}

/// Reporter that only counts completed units.
#[derive(Debug, Default)]
pub struct CountingReporter {
    completed: AtomicUsize,
}

impl CountingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for CountingReporter {
    fn advance(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reporter that uses the `tracing` crate.
///
/// Logs a progress line every `every` completed units and on the last one.
#[derive(Debug)]
pub struct TracingReporter {
    completed: AtomicUsize,
    total: AtomicUsize,
    every: usize,
}

impl TracingReporter {
    pub fn new(every: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            every: every.max(1),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressReporter for TracingReporter {
    fn advance(&self) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.total.load(Ordering::SeqCst);
        if done % self.every == 0 || done == total {
            tracing::info!(done, total, "Processing products");
        }
    }

    fn report(&self, event: BatchEvent<'_>) {
        match event {
            BatchEvent::Started { total } => {
                self.total.store(total, Ordering::SeqCst);
                tracing::info!(total, "Batch started");
            }
            BatchEvent::UnitCompleted {
                code,
                characteristics,
            } => {
                tracing::debug!(%code, characteristics, "Product extracted");
            }
            BatchEvent::UnitSkipped { code, kind, reason } => {
                tracing::debug!(%code, %kind, %reason, "Product skipped");
            }
            BatchEvent::Finished { succeeded, skipped } => {
                tracing::info!(succeeded, skipped, "Batch finished");
            }
        }
    }
}
