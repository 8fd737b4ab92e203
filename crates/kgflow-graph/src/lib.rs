//! kgflow-graph: Neo4j client for kgflow.
//!
//! Writes extracted graph documents into Neo4j and runs read queries,
//! flattening returned rows into JSON maps. The [`GraphStore`] trait is the
//! seam the pipeline depends on.

pub mod client;
pub mod mutations;
pub mod queries;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use mutations::IngestSummary;
pub use queries::ReadQuery;
pub use store::GraphStore;
