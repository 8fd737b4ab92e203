//! kgflow-pipeline: a linear extract → ingest → query pipeline.
//!
//! Free text is turned into a graph document by an LLM, written into Neo4j,
//! and (when a query is supplied) a fixed sample query is read back. Each
//! step takes the record stage produced by the one before it.

pub mod error;
pub mod runner;
pub mod steps;

pub use error::PipelineError;
pub use runner::Pipeline;
pub use steps::{translate_query, SAMPLE_NODES_QUERY};
