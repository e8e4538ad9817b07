use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::domain::CanonicalProperty;
use crate::observability::metrics;
use crate::pipeline::processing::normalize::{
    DiagnosticsCollector, DiagnosticsSink, NoopDiagnostics, NormalizationTrace, PropertyNormalizer,
};
use crate::pipeline::processing::parser::RawRecord;

/// A record that could not be normalized, kept so callers can report on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemFailure {
    /// Position of the record in the input batch
    pub index: usize,
    pub id: Option<String>,
    pub error: String,
}

/// Outcome of one batch: the properties that survived, in input order, and what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub properties: Vec<CanonicalProperty>,
    pub failures: Vec<BatchItemFailure>,
    /// Filled only when diagnostics are enabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<NormalizationTrace>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Use case for normalizing whole CMS result sets
pub struct NormalizeUseCase {
    normalizer: PropertyNormalizer,
    diagnostics: bool,
}

impl NormalizeUseCase {
    pub fn new(normalizer: PropertyNormalizer, diagnostics: bool) -> Self {
        Self {
            normalizer,
            diagnostics,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            PropertyNormalizer::from_config(config),
            config.diagnostics.enabled,
        )
    }

    /// Create a use case with the default normalizer and diagnostics off
    pub fn with_default_normalizer() -> Self {
        Self::new(PropertyNormalizer::default(), false)
    }

    pub fn normalizer(&self) -> &PropertyNormalizer {
        &self.normalizer
    }

    /// Normalize every record, silently dropping the ones that fail.
    pub fn normalize_all(&self, records: &[Value]) -> Vec<CanonicalProperty> {
        self.normalize_all_at(records, Utc::now())
    }

    pub fn normalize_all_at(&self, records: &[Value], now: DateTime<Utc>) -> Vec<CanonicalProperty> {
        self.normalize_batch_at(records, now).properties
    }

    /// Normalize every record and report which ones were skipped and why.
    pub fn normalize_batch(&self, records: &[Value]) -> BatchReport {
        self.normalize_batch_at(records, Utc::now())
    }

    pub fn normalize_batch_at(&self, records: &[Value], now: DateTime<Utc>) -> BatchReport {
        let mut collector = self
            .diagnostics
            .then(|| DiagnosticsCollector::start(format!("batch of {}", records.len())));
        let mut noop = NoopDiagnostics;

        let mut report = BatchReport::default();
        for (index, value) in records.iter().enumerate() {
            let sink: &mut dyn DiagnosticsSink = match collector.as_mut() {
                Some(collector) => collector,
                None => &mut noop,
            };

            let outcome = RawRecord::from_value(value)
                .and_then(|raw| self.normalizer.normalize_at(&raw, now, sink));

            match outcome {
                Ok(property) => report.properties.push(property),
                Err(e) => {
                    let id = RawRecord::identity_hint(value);
                    tracing::warn!(
                        index,
                        id = id.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "Skipping record that could not be normalized"
                    );
                    metrics::normalize::record_failed(e.kind());
                    report.failures.push(BatchItemFailure {
                        index,
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let Some(collector) = collector {
            report.traces = collector.flush();
        }

        tracing::info!(
            records = records.len(),
            normalized = report.properties.len(),
            skipped = report.failures.len(),
            "Normalized batch"
        );
        metrics::normalize::batch_processed(records.len());

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizeConfig;
    use crate::pipeline::processing::images::ImageResolver;
    use serde_json::json;

    #[test]
    fn test_normalize_use_case() {
        let use_case = NormalizeUseCase::with_default_normalizer();
        let records = vec![
            json!({ "_id": "a", "title": "Casa A" }),
            json!({ "title": "sem id" }),
            json!("not a record"),
            json!({ "id": "b", "titulo": "Casa B" }),
        ];

        let report = use_case.normalize_batch(&records);
        assert_eq!(
            report.properties.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].id, None);
        assert_eq!(report.failures[1].index, 2);
        assert!(!report.is_clean());
        assert!(report.traces.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let use_case = NormalizeUseCase::with_default_normalizer();
        let report = use_case.normalize_batch(&[]);
        assert!(report.properties.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_unvalidated_huge_window_keeps_batch_alive() {
        let settings = NormalizeConfig {
            new_listing_window_days: 100_000_000,
            ..NormalizeConfig::default()
        };
        let use_case = NormalizeUseCase::new(PropertyNormalizer::new(ImageResolver::default(), settings), false);
        let records = vec![json!({ "_id": "a", "publishedAt": "2025-05-20" }), json!({ "_id": "b" })];

        let properties = use_case.normalize_all(&records);
        assert_eq!(properties.len(), 2);
        assert!(properties.iter().all(|p| !p.is_new()));
    }

    #[test]
    fn test_diagnostics_collected_when_enabled() {
        let use_case = NormalizeUseCase::new(PropertyNormalizer::default(), true);
        let records = vec![json!({ "_id": "a" }), json!({ "_id": "b", "cidade": "Guararema" })];

        let report = use_case.normalize_batch(&records);
        assert_eq!(report.traces.len(), 2);
        assert!(report.traces[0].location_placeholder);
        assert!(!report.traces[1].location_placeholder);

        let quiet = NormalizeUseCase::new(PropertyNormalizer::default(), false);
        assert_eq!(quiet.normalize_batch(&records).properties, report.properties);
    }
}
