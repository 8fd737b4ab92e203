//! kgflow-core: Shared types, configuration, and error handling for kgflow.
//!
//! This crate provides the foundational types used across all kgflow crates:
//! - Graph documents (nodes, relationships, source provenance)
//! - The typed pipeline record stages
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use crate::config::{ExtractConfig, IngestConfig, KgflowConfig, LlmConfig, Neo4jConfig};
pub use error::KgflowError;
pub use types::{
    ExtractedRecord, GraphDocument, GraphNode, GraphRelationship, PipelineInput, PipelineRecord,
    ResultRow, SourceDocument,
};
