//! The three pipeline steps. Each consumes the record stage it needs and
//! returns the next one; none overwrites a field set by an earlier step.

use kgflow_core::{ExtractedRecord, IngestConfig, PipelineInput, PipelineRecord};
use kgflow_extract::GraphExtractor;
use kgflow_graph::{GraphStore, ReadQuery};

use crate::error::{PipelineError, Result};

/// The placeholder read: up to five arbitrary nodes, in no particular order.
pub const SAMPLE_NODES_QUERY: ReadQuery = ReadQuery {
    cypher: "MATCH (n) RETURN n LIMIT 5",
    columns: &["n"],
};

/// Stub translator. The question is ignored and [`SAMPLE_NODES_QUERY`] is
/// always returned; there is no natural-language-to-Cypher translation.
pub fn translate_query(_question: &str) -> ReadQuery {
    SAMPLE_NODES_QUERY
}

/// Extract a graph document from the record's text.
pub async fn generate_kg<E: GraphExtractor>(
    extractor: &E,
    input: PipelineInput,
) -> Result<ExtractedRecord> {
    let kg_doc = extractor.convert_to_graph(&input.text).await?;
    Ok(ExtractedRecord::new(input, kg_doc))
}

/// Write the record's graph document to the store. The record passes
/// through unchanged.
pub async fn ingest<S: GraphStore>(
    store: &S,
    options: &IngestConfig,
    record: ExtractedRecord,
) -> Result<ExtractedRecord> {
    let summary = store
        .add_graph_document(&record.kg_doc, options)
        .await
        .map_err(PipelineError::Ingestion)?;

    tracing::debug!(
        nodes = summary.nodes,
        relationships = summary.relationships,
        source_linked = summary.source_linked,
        "Graph document ingested"
    );
    Ok(record)
}

/// Run the (translated) query if one was given. Without a query the store
/// is not touched and `result` stays absent.
pub async fn query_graph<S: GraphStore>(store: &S, record: ExtractedRecord) -> Result<PipelineRecord> {
    let read = match record.query.as_deref() {
        Some(question) if !question.is_empty() => Some(translate_query(question)),
        _ => None,
    };
    let Some(read) = read else {
        tracing::debug!("No query supplied, skipping query step");
        return Ok(PipelineRecord::without_result(record));
    };

    let rows = store.read_rows(&read).await.map_err(PipelineError::Query)?;

    tracing::debug!(cypher = read.cypher, rows = rows.len(), "Query returned");
    Ok(PipelineRecord::with_result(record, rows))
}
