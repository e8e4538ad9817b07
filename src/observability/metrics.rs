//! Metrics for the property pipeline
//!
//! Recorded through the `metrics` facade. The library never installs a recorder, so these
//! calls are no-ops unless the embedding application sets one up.

use std::fmt;

/// Enum representing all metric names used in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Parser metrics
    ParserRecordsRejected,

    // Image metrics
    ImagesResolved,
    ImagesUnresolved,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeRecordsFailed,
    NormalizeGalleryDropped,
    NormalizeBatchesProcessed,
    NormalizeBatchSize,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ParserRecordsRejected => "property_parser_records_rejected_total",

            MetricName::ImagesResolved => "property_images_resolved_total",
            MetricName::ImagesUnresolved => "property_images_unresolved_total",

            MetricName::NormalizeRecordsProcessed => "property_normalize_records_processed_total",
            MetricName::NormalizeRecordsFailed => "property_normalize_records_failed_total",
            MetricName::NormalizeGalleryDropped => "property_normalize_gallery_dropped_total",
            MetricName::NormalizeBatchesProcessed => "property_normalize_batches_processed_total",
            MetricName::NormalizeBatchSize => "property_normalize_batch_size",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Parser Metrics
// ============================================================================

pub mod parser {
    use super::MetricName;

    /// A raw value could not be turned into a record at all
    pub fn record_rejected() {
        ::metrics::counter!(MetricName::ParserRecordsRejected.as_str()).increment(1);
    }
}

// ============================================================================
// Image Metrics
// ============================================================================

pub mod images {
    use super::MetricName;

    /// `source` is which step of the priority chain produced the URL
    pub fn resolved(source: &'static str) {
        ::metrics::counter!(MetricName::ImagesResolved.as_str(), "source" => source).increment(1);
    }

    pub fn unresolved() {
        ::metrics::counter!(MetricName::ImagesUnresolved.as_str()).increment(1);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn record_normalized() {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(1);
    }

    pub fn record_failed(kind: &'static str) {
        ::metrics::counter!(MetricName::NormalizeRecordsFailed.as_str(), "kind" => kind).increment(1);
    }

    pub fn gallery_dropped(count: usize) {
        if count > 0 {
            ::metrics::counter!(MetricName::NormalizeGalleryDropped.as_str()).increment(count as u64);
        }
    }

    pub fn batch_processed(batch_size: usize) {
        ::metrics::histogram!(MetricName::NormalizeBatchSize.as_str()).record(batch_size as f64);
        ::metrics::counter!(MetricName::NormalizeBatchesProcessed.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_and_unique() {
        let all = [
            MetricName::ParserRecordsRejected,
            MetricName::ImagesResolved,
            MetricName::ImagesUnresolved,
            MetricName::NormalizeRecordsProcessed,
            MetricName::NormalizeRecordsFailed,
            MetricName::NormalizeGalleryDropped,
            MetricName::NormalizeBatchesProcessed,
            MetricName::NormalizeBatchSize,
        ];
        let names: std::collections::HashSet<_> = all.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), all.len());
        assert!(names.iter().all(|n| n.starts_with("property_")));
        assert_eq!(MetricName::ImagesResolved.to_string(), "property_images_resolved_total");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        parser::record_rejected();
        images::resolved("asset_token");
        images::unresolved();
        normalize::record_normalized();
        normalize::record_failed("missing_identity");
        normalize::gallery_dropped(2);
        normalize::batch_processed(10);
    }
}
