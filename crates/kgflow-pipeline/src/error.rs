//! Error types for the kgflow-pipeline crate.

use kgflow_extract::ExtractError;
use kgflow_graph::GraphError;
use thiserror::Error;

/// A failed run. Every variant is fatal; the variant names the step.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Ingestion failed: {0}")]
    Ingestion(#[source] GraphError),

    #[error("Query failed: {0}")]
    Query(#[source] GraphError),
}

impl PipelineError {
    /// Name of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extract",
            Self::Ingestion(_) => "ingest",
            Self::Query(_) => "query",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
