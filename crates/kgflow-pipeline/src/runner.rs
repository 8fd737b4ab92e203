//! Pipeline runner: extract → ingest → query, strictly in that order.

use std::time::Instant;

use kgflow_core::{IngestConfig, PipelineInput, PipelineRecord};
use kgflow_extract::GraphExtractor;
use kgflow_graph::GraphStore;
use uuid::Uuid;

use crate::error::Result;
use crate::steps;

/// Owns the extractor and the store for the duration of a run.
pub struct Pipeline<E, S> {
    extractor: E,
    store: S,
    ingest: IngestConfig,
}

impl<E: GraphExtractor, S: GraphStore> Pipeline<E, S> {
    pub fn new(extractor: E, store: S) -> Self {
        Self {
            extractor,
            store,
            ingest: IngestConfig::default(),
        }
    }

    pub fn with_ingest_config(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    /// Run all three steps. The first failure aborts the run; nothing an
    /// earlier step wrote is undone.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineRecord> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            run_id = %run_id,
            text_len = input.text.len(),
            has_query = input.query.is_some(),
            "Pipeline run started"
        );

        let outcome = self.run_steps(run_id, input).await;

        match &outcome {
            Ok(record) => tracing::info!(
                run_id = %run_id,
                rows = ?record.result.as_ref().map(Vec::len),
                duration_ms = started.elapsed().as_millis(),
                "Pipeline run finished"
            ),
            Err(e) => tracing::error!(
                run_id = %run_id,
                step = e.step(),
                error = %e,
                "Pipeline run aborted"
            ),
        }
        outcome
    }

    async fn run_steps(&self, run_id: Uuid, input: PipelineInput) -> Result<PipelineRecord> {
        let step_start = Instant::now();
        let extracted = steps::generate_kg(&self.extractor, input).await?;
        tracing::info!(
            run_id = %run_id,
            step = "extract",
            nodes = extracted.kg_doc.nodes.len(),
            relationships = extracted.kg_doc.relationships.len(),
            duration_ms = step_start.elapsed().as_millis(),
            "Step complete"
        );

        let step_start = Instant::now();
        let ingested = steps::ingest(&self.store, &self.ingest, extracted).await?;
        tracing::info!(
            run_id = %run_id,
            step = "ingest",
            duration_ms = step_start.elapsed().as_millis(),
            "Step complete"
        );

        let step_start = Instant::now();
        let record = steps::query_graph(&self.store, ingested).await?;
        tracing::info!(
            run_id = %run_id,
            step = "query",
            skipped = record.result.is_none(),
            duration_ms = step_start.elapsed().as_millis(),
            "Step complete"
        );

        Ok(record)
    }
}
