use serde::Serialize;
use std::time::Instant;

/// What happened to one record during normalization. Development aid only; the
/// canonical output never depends on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationTrace {
    pub id: String,
    pub title: String,
    pub has_description: bool,
    pub main_image_resolved: bool,
    pub gallery_resolved: usize,
    pub gallery_dropped: usize,
    pub location_placeholder: bool,
}

/// Receives per-record traces. Passed explicitly into each normalization call.
pub trait DiagnosticsSink {
    fn record(&mut self, trace: NormalizationTrace);

    /// Lets the normalizer skip building traces nobody will read.
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink used when diagnostics are switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl DiagnosticsSink for NoopDiagnostics {
    fn record(&mut self, _trace: NormalizationTrace) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Buffers traces for one batch run and logs them as a group when flushed.
#[derive(Debug)]
pub struct DiagnosticsCollector {
    label: String,
    started_at: Instant,
    entries: Vec<NormalizationTrace>,
}

impl DiagnosticsCollector {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started_at: Instant::now(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[NormalizationTrace] {
        &self.entries
    }

    /// End the run: emit one grouped debug block and hand the traces back.
    pub fn flush(self) -> Vec<NormalizationTrace> {
        let span = tracing::debug_span!("normalization_diagnostics", batch = %self.label);
        let _enter = span.enter();

        let without_image = self.entries.iter().filter(|t| !t.main_image_resolved).count();
        let dropped: usize = self.entries.iter().map(|t| t.gallery_dropped).sum();
        tracing::debug!(
            records = self.entries.len(),
            without_main_image = without_image,
            gallery_entries_dropped = dropped,
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "Normalization batch summary"
        );
        for trace in &self.entries {
            tracing::debug!(
                id = %trace.id,
                title = %trace.title,
                has_description = trace.has_description,
                main_image = trace.main_image_resolved,
                gallery = trace.gallery_resolved,
                gallery_dropped = trace.gallery_dropped,
                location_placeholder = trace.location_placeholder,
                "Normalized record"
            );
        }

        self.entries
    }
}

impl DiagnosticsSink for DiagnosticsCollector {
    fn record(&mut self, trace: NormalizationTrace) {
        self.entries.push(trace);
    }
}
