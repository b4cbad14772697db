//! Per-session performance metrics record
//!
//! A mutable accumulator of load and rendering-quality measurements.
//! Every field stays unset until its signal arrives; a missing host
//! capability just leaves the field `None`.

use serde::{Deserialize, Serialize};

/// Accumulated performance measurements for one page session.
///
/// All durations are milliseconds from navigation start; cumulative
/// layout shift is the unitless web-vitals score. Serialized field names
/// match the analytics wire format (camelCase, unset fields omitted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    /// Navigation start to load-event end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_load_time: Option<f64>,

    /// Navigation start to DOMContentLoaded end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded: Option<f64>,

    /// First contentful paint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contentful_paint: Option<f64>,

    /// Largest contentful paint (latest candidate wins)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_contentful_paint: Option<f64>,

    /// Sum of layout shifts not caused by recent user input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_layout_shift: Option<f64>,

    /// Processing-start minus event-start of the first input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_input_delay: Option<f64>,
}

impl MetricsRecord {
    /// True when no signal has populated any field yet
    pub fn is_empty(&self) -> bool {
        self.set_field_count() == 0
    }

    /// Number of fields a signal has populated
    pub fn set_field_count(&self) -> usize {
        [
            self.page_load_time,
            self.dom_content_loaded,
            self.first_contentful_paint,
            self.largest_contentful_paint,
            self.cumulative_layout_shift,
            self.first_input_delay,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_to_empty_object() {
        let record = MetricsRecord::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }

    #[test]
    fn test_set_fields_serialize_camel_case() {
        let record = MetricsRecord {
            page_load_time: Some(1234.5),
            cumulative_layout_shift: Some(0.02),
            ..MetricsRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pageLoadTime"], 1234.5);
        assert_eq!(json["cumulativeLayoutShift"], 0.02);
        assert!(json.get("firstInputDelay").is_none());
    }

    #[test]
    fn test_deserialize_partial_record() {
        let record: MetricsRecord =
            serde_json::from_str(r#"{"largestContentfulPaint": 1800.0}"#).unwrap();
        assert_eq!(record.largest_contentful_paint, Some(1800.0));
        assert_eq!(record.set_field_count(), 1);
    }
}
