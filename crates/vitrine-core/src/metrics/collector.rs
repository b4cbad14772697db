//! Passive performance metrics collector
//!
//! Probes the host for each signal category and spawns one listener task
//! per supported category. Listeners update the shared record
//! independently; snapshot reads never block on more data arriving.

use crate::metrics::record::MetricsRecord;
use crate::metrics::signal::{
    NavigationTiming, PerformanceSignal, SignalCategory, SignalHost,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Collects web-vitals signals into a per-session metrics record.
///
/// Construction registers listeners and must run inside a tokio runtime.
/// Missing host capabilities are skipped, not errors; the affected fields
/// simply stay unset.
pub struct PerformanceCollector {
    record: Arc<RwLock<MetricsRecord>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    unsupported: Vec<SignalCategory>,
}

impl PerformanceCollector {
    pub fn new(host: &dyn SignalHost) -> Self {
        let record = Arc::new(RwLock::new(MetricsRecord::default()));
        let mut tasks = Vec::new();
        let mut unsupported = Vec::new();

        for category in SignalCategory::ALL {
            match host.subscribe(category) {
                Ok(receiver) => {
                    tasks.push(spawn_listener(category, receiver, Arc::clone(&record)));
                }
                Err(probe) => {
                    debug!(category = ?probe.0, "Signal category unsupported, skipping");
                    unsupported.push(probe.0);
                }
            }
        }

        // Load measurement: compute now if the document already finished,
        // otherwise wait for the load notification exactly once.
        if host.document_complete() {
            if let Some(timing) = host.navigation_timing() {
                apply_navigation(&record, timing);
            }
        } else {
            let mut receiver = host.on_load();
            let record_handle = Arc::clone(&record);
            tasks.push(tokio::spawn(async move {
                if let Ok(timing) = receiver.recv().await {
                    apply_navigation(&record_handle, timing);
                }
            }));
        }

        Self {
            record,
            tasks: Mutex::new(tasks),
            unsupported,
        }
    }

    /// Non-blocking copy of everything recorded so far
    pub fn snapshot(&self) -> MetricsRecord {
        self.record.read().clone()
    }

    /// Categories the host could not provide
    pub fn unsupported(&self) -> &[SignalCategory] {
        &self.unsupported
    }

    /// Log every currently-set field
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            page_load_ms = ?snapshot.page_load_time,
            dom_content_loaded_ms = ?snapshot.dom_content_loaded,
            fcp_ms = ?snapshot.first_contentful_paint,
            lcp_ms = ?snapshot.largest_contentful_paint,
            cls = ?snapshot.cumulative_layout_shift,
            fid_ms = ?snapshot.first_input_delay,
            "Performance metrics"
        );
    }

    /// Detach all listeners. Safe to call repeatedly or when no listener
    /// was ever registered.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for PerformanceCollector {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_listener(
    category: SignalCategory,
    mut receiver: broadcast::Receiver<PerformanceSignal>,
    record: Arc<RwLock<MetricsRecord>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(signal) => {
                    // Receivers see every signal; apply only our category
                    if signal.category() == category {
                        apply_signal(&record, signal);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(?category, skipped, "Signal listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn apply_signal(record: &RwLock<MetricsRecord>, signal: PerformanceSignal) {
    let mut record = record.write();
    match signal {
        PerformanceSignal::Paint { name, start_time } => {
            if name == "first-contentful-paint" {
                record.first_contentful_paint = Some(start_time);
            }
        }
        PerformanceSignal::LargestContentfulPaint { start_time } => {
            // Latest candidate wins
            record.largest_contentful_paint = Some(start_time);
        }
        PerformanceSignal::LayoutShift {
            value,
            had_recent_input,
        } => {
            if !had_recent_input {
                let total = record.cumulative_layout_shift.unwrap_or(0.0) + value;
                record.cumulative_layout_shift = Some(total);
            }
        }
        PerformanceSignal::FirstInput {
            start_time,
            processing_start,
        } => {
            // Only the first qualifying input counts
            if record.first_input_delay.is_none() {
                record.first_input_delay = Some(processing_start - start_time);
            }
        }
    }
}

fn apply_navigation(record: &RwLock<MetricsRecord>, timing: NavigationTiming) {
    let mut record = record.write();
    record.page_load_time = Some(timing.load_event_end - timing.fetch_start);
    record.dom_content_loaded =
        Some(timing.dom_content_loaded_event_end - timing.fetch_start);
}
