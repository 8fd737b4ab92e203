//! The seam the pipeline talks to: anything that can take a graph document
//! and answer a read query.

use kgflow_core::{GraphDocument, IngestConfig, ResultRow};

use crate::client::{GraphClient, GraphError};
use crate::mutations::IngestSummary;
use crate::queries::ReadQuery;

/// A graph store the pipeline writes to and reads from.
#[allow(async_fn_in_trait)]
pub trait GraphStore {
    /// Persist an extracted graph document.
    async fn add_graph_document(
        &self,
        doc: &GraphDocument,
        options: &IngestConfig,
    ) -> Result<IngestSummary, GraphError>;

    /// Run a read query, returning rows in the store's natural order.
    async fn read_rows(&self, read: &ReadQuery) -> Result<Vec<ResultRow>, GraphError>;
}

impl GraphStore for GraphClient {
    async fn add_graph_document(
        &self,
        doc: &GraphDocument,
        options: &IngestConfig,
    ) -> Result<IngestSummary, GraphError> {
        GraphClient::add_graph_document(self, doc, options).await
    }

    async fn read_rows(&self, read: &ReadQuery) -> Result<Vec<ResultRow>, GraphError> {
        GraphClient::read_rows(self, read).await
    }
}
