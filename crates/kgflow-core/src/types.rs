//! Core domain types for kgflow.
//!
//! A [`GraphDocument`] is what the extraction step produces and the
//! ingestion step consumes. The pipeline record is modeled as typed stages:
//! [`PipelineInput`] → [`ExtractedRecord`] → [`PipelineRecord`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Graph Document ────────────────────────────────────────────────

/// An entity extracted from text. Identified by `(node_type, id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Whether `other` names the same entity.
    pub fn same_entity(&self, other: &GraphNode) -> bool {
        self.id == other.id && self.node_type == other.node_type
    }
}

/// A directed relationship between two extracted entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphRelationship {
    pub source: GraphNode,
    pub target: GraphNode,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Provenance: the text a graph document was extracted from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: Uuid,
    pub page_content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl SourceDocument {
    /// Build a source whose id is derived from the text, so the same text
    /// always names the same source.
    pub fn from_text(text: &str) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, text.as_bytes()),
            page_content: text.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Entities and relations extracted from one source text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
    pub source: SourceDocument,
}

impl GraphDocument {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

// ── Pipeline Record ───────────────────────────────────────────────

/// One row returned by the graph store, keyed by return column.
pub type ResultRow = serde_json::Map<String, serde_json::Value>;

/// What the caller hands to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineInput {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl PipelineInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// The record after extraction. Ingestion passes it through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedRecord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub kg_doc: GraphDocument,
}

impl ExtractedRecord {
    pub fn new(input: PipelineInput, kg_doc: GraphDocument) -> Self {
        Self {
            text: input.text,
            query: input.query,
            kg_doc,
        }
    }
}

/// The final record returned by a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineRecord {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub kg_doc: GraphDocument,
    /// Absent when no query was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ResultRow>>,
}

impl PipelineRecord {
    /// Finish a record without running a query.
    pub fn without_result(record: ExtractedRecord) -> Self {
        Self {
            text: record.text,
            query: record.query,
            kg_doc: record.kg_doc,
            result: None,
        }
    }

    pub fn with_result(record: ExtractedRecord, rows: Vec<ResultRow>) -> Self {
        Self {
            result: Some(rows),
            ..Self::without_result(record)
        }
    }
}
