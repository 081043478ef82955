//! Application counters, exported on `/metrics/app` in their own registry.
//! The HTTP middleware metrics stay on `/metrics`.

use prometheus::{IntCounterVec, Opts, Registry};

#[derive(Clone)]
pub struct GenerationMetrics {
    pub documents_generated: IntCounterVec,
    pub generation_failures: IntCounterVec,
}

impl GenerationMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            documents_generated: IntCounterVec::new(
                Opts::new(
                    "dha_documents_generated_total",
                    "Documents generated, by document type",
                ),
                &["document_type"],
            )?,
            generation_failures: IntCounterVec::new(
                Opts::new(
                    "dha_generation_failures_total",
                    "Rejected or failed generation requests, by reason",
                ),
                &["reason"],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.documents_generated.clone()))?;
        registry.register(Box::new(self.generation_failures.clone()))?;
        Ok(())
    }

    pub fn record_success(&self, document_type: &str) {
        self.documents_generated
            .with_label_values(&[document_type])
            .inc();
    }

    pub fn record_failure(&self, reason: &str) {
        self.generation_failures.with_label_values(&[reason]).inc();
    }
}
