//! Web vitals scoring
//!
//! Two-threshold bucketing per field using the standard web-vitals
//! boundaries. A missing measurement scores 0.0: absent data is treated
//! as worst case, never best case.

use crate::metrics::record::MetricsRecord;
use serde::Serialize;
use std::fmt;

/// Largest contentful paint thresholds, ms (good ≤ 2500, poor > 4000)
pub const LCP_THRESHOLDS: (f64, f64) = (2500.0, 4000.0);
/// First input delay thresholds, ms (good ≤ 100, poor > 300)
pub const FID_THRESHOLDS: (f64, f64) = (100.0, 300.0);
/// Cumulative layout shift thresholds (good ≤ 0.1, poor > 0.25)
pub const CLS_THRESHOLDS: (f64, f64) = (0.1, 0.25);

/// Overall quality label derived from the mean field score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::Good => "good",
            Rating::NeedsImprovement => "needs-improvement",
            Rating::Poor => "poor",
        };
        f.write_str(label)
    }
}

/// Per-field scores (1.0 good, 0.5 needs improvement, 0.0 poor/unset)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScores {
    pub lcp: f64,
    pub fid: f64,
    pub cls: f64,
}

/// Scoring result for a metrics record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VitalsScore {
    pub individual: FieldScores,
    /// Unweighted mean of the three field scores
    pub overall: f64,
    pub rating: Rating,
}

fn score_field(value: Option<f64>, thresholds: (f64, f64)) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v <= thresholds.0 => 1.0,
        Some(v) if v <= thresholds.1 => 0.5,
        Some(_) => 0.0,
    }
}

/// Score a record on LCP, FID and CLS
pub fn web_vitals_score(record: &MetricsRecord) -> VitalsScore {
    let individual = FieldScores {
        lcp: score_field(record.largest_contentful_paint, LCP_THRESHOLDS),
        fid: score_field(record.first_input_delay, FID_THRESHOLDS),
        cls: score_field(record.cumulative_layout_shift, CLS_THRESHOLDS),
    };
    let overall = (individual.lcp + individual.fid + individual.cls) / 3.0;
    let rating = if overall >= 0.9 {
        Rating::Good
    } else if overall >= 0.5 {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    };

    VitalsScore {
        individual,
        overall,
        rating,
    }
}
