//! Progress-callback trait for per-plan batch events.
//!
//! Pass a `&dyn BatchProgressCallback` to [`crate::batch::run_batch_with`]
//! to observe a run as it happens. The CLI drives its progress bar this
//! way; library callers can forward events anywhere without the batch
//! knowing how they are displayed.
//!
//! # Example
//!
//! ```rust
//! use plan2md::{BatchProgressCallback, PlanReport};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountFailures(AtomicUsize);
//!
//! impl BatchProgressCallback for CountFailures {
//!     fn on_plan_complete(&self, _index: usize, _total: usize, report: &PlanReport) {
//!         if !report.outcome.is_success() {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//! ```

use crate::output::{BatchSummary, PlanReport};

/// Called by the batch as it works through the manifest.
///
/// All methods have default no-op implementations so callers only
/// override what they care about. Plans are processed sequentially, so
/// events arrive in manifest order.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after the manifest is loaded.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a plan is looked at.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the manifest
    /// * `total` — number of plans in the manifest
    /// * `document_code` — the plan's key
    fn on_plan_start(&self, index: usize, total: usize, document_code: &str) {
        let _ = (index, total, document_code);
    }

    /// Called when a plan has been written, skipped or has failed.
    fn on_plan_complete(&self, index: usize, total: usize, report: &PlanReport) {
        let _ = (index, total, report);
    }

    /// Called once, after every plan has been attempted.
    fn on_batch_complete(&self, summary: &BatchSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::PlanOutcome;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        failed_in_summary: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.started_total.store(total, Ordering::SeqCst);
        }

        fn on_plan_start(&self, _index: usize, _total: usize, _document_code: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_plan_complete(&self, _index: usize, _total: usize, _report: &PlanReport) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, summary: &BatchSummary) {
            self.failed_in_summary.store(summary.failed, Ordering::SeqCst);
        }
    }

    fn report() -> PlanReport {
        PlanReport {
            document_code: "HS-1".into(),
            source: PathBuf::from("raw/a.pdf"),
            outcome: PlanOutcome::AlreadyPresent {
                path: PathBuf::from("processed/HS-1.md"),
            },
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_plan_start(1, 2, "HS-1");
        cb.on_plan_complete(1, 2, &report());
        cb.on_batch_complete(&BatchSummary::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(2);
        tracker.on_plan_start(1, 2, "HS-1");
        tracker.on_plan_complete(1, 2, &report());
        tracker.on_plan_start(2, 2, "HS-2");

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);

        let summary = BatchSummary {
            failed: 1,
            ..BatchSummary::default()
        };
        tracker.on_batch_complete(&summary);
        assert_eq!(tracker.failed_in_summary.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn BatchProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_batch_start(10);
        cb.on_plan_start(1, 10, "HS-1");
    }
}
