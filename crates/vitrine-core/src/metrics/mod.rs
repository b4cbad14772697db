//! Performance metrics collection for vitrine
//!
//! Passive web-vitals capture (paint, LCP, CLS, FID, navigation timing)
//! with snapshot, logging, analytics export and scoring.

pub mod collector;
pub mod export;
pub mod record;
pub mod score;
pub mod signal;

pub use collector::PerformanceCollector;
pub use export::{AnalyticsExporter, AnalyticsPayload};
pub use record::MetricsRecord;
pub use score::{web_vitals_score, FieldScores, Rating, VitalsScore};
pub use signal::{
    NavigationTiming, PerformanceSignal, SignalCategory, SignalHost, SimulatedHost, Unsupported,
};
