//! Write operations: persisting extracted graph documents.
//!
//! Nodes are merged on `(label, id)`. Relationships match their endpoints
//! on `(label, id)` and merge on `(source, type, target)`. Properties are
//! overlaid with `SET +=`.
//! Whether a repeated ingestion merges into or duplicates earlier data is
//! whatever MERGE does for the store's current contents.

use std::collections::HashMap;

use kgflow_core::{GraphDocument, GraphNode, GraphRelationship, IngestConfig};
use neo4rs::{query, Query};

use crate::client::{GraphClient, GraphError};

/// Label added to every node when `base_entity_label` is enabled.
pub const BASE_ENTITY_LABEL: &str = "__Entity__";

/// Counts of what one ingestion wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub nodes: usize,
    pub relationships: usize,
    pub source_linked: bool,
}

impl GraphClient {
    /// Persist a graph document in a single transaction.
    pub async fn add_graph_document(
        &self,
        doc: &GraphDocument,
        options: &IngestConfig,
    ) -> Result<IngestSummary, GraphError> {
        if options.base_entity_label {
            // Schema changes cannot share a transaction with writes.
            self.run(query(&entity_constraint_cypher())).await?;
        }

        let mut txn = self.start_txn().await?;

        if options.include_source {
            txn.run(source_query(doc)).await?;
        }

        for node in &doc.nodes {
            txn.run(node_query(node, doc, options)).await?;
        }

        for rel in &doc.relationships {
            txn.run(relationship_query(rel, options)).await?;
        }

        txn.commit().await?;

        let summary = IngestSummary {
            nodes: doc.nodes.len(),
            relationships: doc.relationships.len(),
            source_linked: options.include_source,
        };
        tracing::debug!(
            source_id = %doc.source.id,
            nodes = summary.nodes,
            relationships = summary.relationships,
            "Graph document committed"
        );
        Ok(summary)
    }
}

// ── Query Builders ───────────────────────────────────────────────

fn source_query(doc: &GraphDocument) -> Query {
    query(
        "MERGE (d:Document {id: $doc_id})
         SET d.text = $text
         SET d += $metadata",
    )
    .param("doc_id", doc.source.id.to_string())
    .param("text", doc.source.page_content.clone())
    .param("metadata", to_param_map(&doc.source.metadata))
}

fn node_query(node: &GraphNode, doc: &GraphDocument, options: &IngestConfig) -> Query {
    query(&node_merge_cypher(&node.node_type, options))
        .param("id", node.id.clone())
        .param("props", to_param_map(&node.properties))
        .param("doc_id", doc.source.id.to_string())
}

fn relationship_query(rel: &GraphRelationship, options: &IngestConfig) -> Query {
    query(&relationship_merge_cypher(
        &rel.source.node_type,
        &rel.target.node_type,
        &rel.rel_type,
        options,
    ))
    .param("source_id", rel.source.id.clone())
    .param("target_id", rel.target.id.clone())
    .param("props", to_param_map(&rel.properties))
}

/// Cypher that merges one node, optionally linking it to its source document.
pub fn node_merge_cypher(node_type: &str, options: &IngestConfig) -> String {
    let label = quote_identifier(node_type);
    let mut cypher = if options.base_entity_label {
        format!(
            "MERGE (n:{base} {{id: $id}})
             SET n:{label}
             SET n += $props",
            base = quote_identifier(BASE_ENTITY_LABEL)
        )
    } else {
        format!(
            "MERGE (n:{label} {{id: $id}})
             SET n += $props"
        )
    };

    if options.include_source {
        cypher.push_str(
            "
             WITH n
             MATCH (d:Document {id: $doc_id})
             MERGE (d)-[:MENTIONS]->(n)",
        );
    }
    cypher
}

/// Cypher that matches both endpoints by `(label, id)` and merges the
/// relationship between them. Endpoints are written by the node queries
/// earlier in the same transaction.
pub fn relationship_merge_cypher(
    source_type: &str,
    target_type: &str,
    rel_type: &str,
    options: &IngestConfig,
) -> String {
    let (source_label, target_label) = if options.base_entity_label {
        let base = quote_identifier(BASE_ENTITY_LABEL);
        (base.clone(), base)
    } else {
        (quote_identifier(source_type), quote_identifier(target_type))
    };
    let rel = quote_identifier(rel_type);

    format!(
        "MATCH (a:{source_label} {{id: $source_id}})
         MATCH (b:{target_label} {{id: $target_id}})
         MERGE (a)-[r:{rel}]->(b)
         SET r += $props"
    )
}

fn entity_constraint_cypher() -> String {
    format!(
        "CREATE CONSTRAINT IF NOT EXISTS FOR (e:{}) REQUIRE e.id IS UNIQUE",
        quote_identifier(BASE_ENTITY_LABEL)
    )
}

// ── Helpers ──────────────────────────────────────────────────────

/// Backtick-quote a label or relationship type taken from model output.
pub fn quote_identifier(raw: &str) -> String {
    format!("`{}`", raw.replace('`', "``"))
}

fn to_param_map(props: &std::collections::BTreeMap<String, String>) -> HashMap<String, String> {
    props
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
