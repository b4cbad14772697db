//! Performance signal sources (capability-probe pattern)
//!
//! The collector is polymorphic over whichever signal categories the host
//! exposes. `SignalHost::subscribe` either hands back a broadcast receiver
//! or reports `Unsupported`; a missing category is never an error, just an
//! unset field in the record.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

/// Classes of performance events a host may or may not expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCategory {
    Paint,
    LargestContentfulPaint,
    LayoutShift,
    FirstInput,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 4] = [
        SignalCategory::Paint,
        SignalCategory::LargestContentfulPaint,
        SignalCategory::LayoutShift,
        SignalCategory::FirstInput,
    ];
}

/// A single performance event emitted by the host
#[derive(Debug, Clone)]
pub enum PerformanceSignal {
    /// Paint timing entry (e.g. "first-contentful-paint")
    Paint { name: String, start_time: f64 },
    /// Largest-contentful-paint candidate
    LargestContentfulPaint { start_time: f64 },
    /// Layout shift with its attribution flag
    LayoutShift { value: f64, had_recent_input: bool },
    /// Input event with processing timestamps
    FirstInput {
        start_time: f64,
        processing_start: f64,
    },
}

impl PerformanceSignal {
    pub fn category(&self) -> SignalCategory {
        match self {
            PerformanceSignal::Paint { .. } => SignalCategory::Paint,
            PerformanceSignal::LargestContentfulPaint { .. } => {
                SignalCategory::LargestContentfulPaint
            }
            PerformanceSignal::LayoutShift { .. } => SignalCategory::LayoutShift,
            PerformanceSignal::FirstInput { .. } => SignalCategory::FirstInput,
        }
    }
}

/// Navigation timing milestones, milliseconds since time origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationTiming {
    pub fetch_start: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_end: f64,
}

/// Capability probe result for an unsupported category
#[derive(Debug, Clone, Copy, Error)]
#[error("Signal category not supported by host: {0:?}")]
pub struct Unsupported(pub SignalCategory);

/// Source of performance signals and navigation timing.
///
/// One subscription per category; receivers see every published signal
/// and filter on their own category.
pub trait SignalHost: Send + Sync {
    /// Subscribe to a signal category, or learn the host lacks it
    fn subscribe(
        &self,
        category: SignalCategory,
    ) -> Result<broadcast::Receiver<PerformanceSignal>, Unsupported>;

    /// Whether the document finished loading already
    fn document_complete(&self) -> bool;

    /// Navigation milestones, if the host records them
    fn navigation_timing(&self) -> Option<NavigationTiming>;

    /// One-shot load-completion notification (used when the document is
    /// not complete at collector construction time)
    fn on_load(&self) -> broadcast::Receiver<NavigationTiming>;
}

/// Broadcast-backed host double for tests and the CLI.
///
/// Supports a configurable category set so partial-capability hosts can
/// be simulated.
pub struct SimulatedHost {
    signals: broadcast::Sender<PerformanceSignal>,
    load: broadcast::Sender<NavigationTiming>,
    supported: HashSet<SignalCategory>,
    timing: parking_lot::RwLock<Option<NavigationTiming>>,
    complete: AtomicBool,
}

impl SimulatedHost {
    /// Host supporting every category, document still loading
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(256);
        let (load, _) = broadcast::channel(4);
        Self {
            signals,
            load,
            supported: SignalCategory::ALL.into_iter().collect(),
            timing: parking_lot::RwLock::new(None),
            complete: AtomicBool::new(false),
        }
    }

    /// Drop support for one category (partial-capability host)
    pub fn without(mut self, category: SignalCategory) -> Self {
        self.supported.remove(&category);
        self
    }

    /// Mark the document as already complete with the given timing
    pub fn already_loaded(self, timing: NavigationTiming) -> Self {
        *self.timing.write() = Some(timing);
        self.complete.store(true, Ordering::SeqCst);
        self
    }

    /// Publish a performance signal to all subscribers
    pub fn emit(&self, signal: PerformanceSignal) {
        // Ignore send errors (no subscribers)
        let _ = self.signals.send(signal);
    }

    /// Finish loading: record timing and notify load listeners
    pub fn complete_load(&self, timing: NavigationTiming) {
        *self.timing.write() = Some(timing);
        self.complete.store(true, Ordering::SeqCst);
        let _ = self.load.send(timing);
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHost for SimulatedHost {
    fn subscribe(
        &self,
        category: SignalCategory,
    ) -> Result<broadcast::Receiver<PerformanceSignal>, Unsupported> {
        if self.supported.contains(&category) {
            Ok(self.signals.subscribe())
        } else {
            Err(Unsupported(category))
        }
    }

    fn document_complete(&self) -> bool {
        self.complete.load(Ordering::SeqCst)
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        *self.timing.read()
    }

    fn on_load(&self) -> broadcast::Receiver<NavigationTiming> {
        self.load.subscribe()
    }
}
