//! LLM graph transformer: text in, [`GraphDocument`] out.
//!
//! One model call per text. The reply is normalized (id and type casing),
//! nodes mentioned only by relationships are back-filled, duplicates are
//! collapsed, and in strict mode anything outside the allowed type lists is
//! dropped. Nothing else about the model's output is validated.

use std::collections::BTreeMap;

use chrono::Utc;
use kgflow_core::{ExtractConfig, GraphDocument, GraphNode, GraphRelationship, SourceDocument};
use serde::Deserialize;

use crate::error::{ExtractError, Result};
use crate::llm::LlmClient;
use crate::prompt;

/// Anything that can turn free text into a graph document.
#[allow(async_fn_in_trait)]
pub trait GraphExtractor {
    async fn convert_to_graph(&self, text: &str) -> Result<GraphDocument>;
}

/// Extracts graph documents by prompting an [`LlmClient`].
pub struct LlmGraphTransformer<C> {
    client: C,
    allowed_nodes: Vec<String>,
    allowed_relationships: Vec<String>,
    strict_mode: bool,
}

impl<C: LlmClient> LlmGraphTransformer<C> {
    /// Unrestricted transformer.
    pub fn new(client: C) -> Self {
        Self {
            client,
            allowed_nodes: Vec::new(),
            allowed_relationships: Vec::new(),
            strict_mode: true,
        }
    }

    pub fn from_config(client: C, cfg: &ExtractConfig) -> Self {
        Self {
            client,
            allowed_nodes: cfg.allowed_nodes.clone(),
            allowed_relationships: cfg.allowed_relationships.clone(),
            strict_mode: cfg.strict_mode,
        }
    }

    pub fn with_allowed_nodes(mut self, nodes: Vec<String>) -> Self {
        self.allowed_nodes = nodes;
        self
    }

    pub fn with_allowed_relationships(mut self, relationships: Vec<String>) -> Self {
        self.allowed_relationships = relationships;
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Turn the model's JSON reply into a graph document for `text`.
    fn build_document(&self, text: &str, reply: &str) -> Result<GraphDocument> {
        let raw: RawGraph =
            serde_json::from_str(reply).map_err(|e| ExtractError::Parse(e.to_string()))?;

        let mut nodes: Vec<GraphNode> = Vec::new();
        for raw_node in raw.nodes {
            if let Some(node) = normalize_node(&raw_node.id, &raw_node.node_type) {
                let node = GraphNode {
                    properties: collect_properties(raw_node.properties),
                    ..node
                };
                push_or_merge(&mut nodes, node);
            }
        }

        let mut relationships = Vec::new();
        for raw_rel in raw.relationships {
            let source = normalize_node(&raw_rel.source_node_id, &raw_rel.source_node_type);
            let target = normalize_node(&raw_rel.target_node_id, &raw_rel.target_node_type);
            let rel_type = normalize_rel_type(&raw_rel.rel_type);
            let (Some(source), Some(target), Some(rel_type)) = (source, target, rel_type) else {
                tracing::debug!(rel_type = %raw_rel.rel_type, "Dropping incomplete relationship");
                continue;
            };

            push_or_merge(&mut nodes, source.clone());
            push_or_merge(&mut nodes, target.clone());
            relationships.push(GraphRelationship {
                source,
                target,
                rel_type,
                properties: collect_properties(raw_rel.properties),
            });
        }

        if self.strict_mode {
            self.apply_strict_filter(&mut nodes, &mut relationships);
        }

        let source = SourceDocument::from_text(text)
            .with_metadata("model", self.client.model())
            .with_metadata("extracted_at", Utc::now().to_rfc3339());

        Ok(GraphDocument {
            nodes,
            relationships,
            source,
        })
    }

    fn apply_strict_filter(
        &self,
        nodes: &mut Vec<GraphNode>,
        relationships: &mut Vec<GraphRelationship>,
    ) {
        if !self.allowed_nodes.is_empty() {
            let allowed = &self.allowed_nodes;
            nodes.retain(|n| contains_ignore_case(allowed, &n.node_type));
            relationships.retain(|r| {
                contains_ignore_case(allowed, &r.source.node_type)
                    && contains_ignore_case(allowed, &r.target.node_type)
            });
        }
        if !self.allowed_relationships.is_empty() {
            let allowed = &self.allowed_relationships;
            relationships.retain(|r| contains_ignore_case(allowed, &r.rel_type));
        }
    }
}

impl<C: LlmClient> GraphExtractor for LlmGraphTransformer<C> {
    async fn convert_to_graph(&self, text: &str) -> Result<GraphDocument> {
        let messages =
            prompt::extraction_messages(text, &self.allowed_nodes, &self.allowed_relationships);
        let reply = self
            .client
            .generate_structured(&messages, &prompt::graph_schema())
            .await?;

        let doc = self.build_document(text, &reply)?;
        tracing::info!(
            model = %self.client.model(),
            nodes = doc.nodes.len(),
            relationships = doc.relationships.len(),
            "Extracted graph document"
        );
        Ok(doc)
    }
}

// ── Model Reply ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Deserialize)]
struct RawRelationship {
    source_node_id: String,
    source_node_type: String,
    target_node_id: String,
    target_node_type: String,
    #[serde(rename = "type")]
    rel_type: String,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

#[derive(Deserialize)]
struct RawProperty {
    key: String,
    value: String,
}

// ── Normalization ────────────────────────────────────────────────

fn normalize_node(id: &str, node_type: &str) -> Option<GraphNode> {
    let id = title_case(id.trim());
    let node_type = capitalize(node_type.trim());
    if id.is_empty() || node_type.is_empty() {
        return None;
    }
    Some(GraphNode::new(id, node_type))
}

/// Upper-case the first letter of every word, leave the rest alone.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// First letter upper, the rest lower.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn normalize_rel_type(s: &str) -> Option<String> {
    let normalized = s
        .trim()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase();
    (!normalized.is_empty()).then_some(normalized)
}

fn collect_properties(props: Vec<RawProperty>) -> BTreeMap<String, String> {
    props
        .into_iter()
        .filter_map(|p| {
            let key = p.key.trim().to_string();
            (!key.is_empty()).then_some((key, p.value))
        })
        .collect()
}

/// Keep the first occurrence of an entity; later ones only add properties.
fn push_or_merge(nodes: &mut Vec<GraphNode>, node: GraphNode) {
    match nodes.iter_mut().find(|n| n.same_entity(&node)) {
        Some(existing) => {
            for (k, v) in node.properties {
                existing.properties.entry(k).or_insert(v);
            }
        }
        None => nodes.push(node),
    }
}

fn contains_ignore_case(allowed: &[String], value: &str) -> bool {
    let value = value.to_lowercase();
    allowed.iter().any(|a| a.to_lowercase() == value)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::llm::{Message, ResponseSchema};

    /// Returns a canned reply and remembers the prompt it was sent.
    struct CannedLlm {
        reply: String,
        seen: RefCell<Vec<Message>>,
    }

    impl CannedLlm {
        fn new(reply: serde_json::Value) -> Self {
            Self {
                reply: reply.to_string(),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn raw(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl LlmClient for CannedLlm {
        fn model(&self) -> &str {
            "canned-model"
        }

        async fn generate_structured(
            &self,
            messages: &[Message],
            _schema: &ResponseSchema,
        ) -> Result<String> {
            self.seen.borrow_mut().extend_from_slice(messages);
            Ok(self.reply.clone())
        }
    }

    struct FailingLlm;

    impl LlmClient for FailingLlm {
        fn model(&self) -> &str {
            "failing-model"
        }

        async fn generate_structured(
            &self,
            _messages: &[Message],
            _schema: &ResponseSchema,
        ) -> Result<String> {
            Err(ExtractError::Api {
                status: 500,
                body: "upstream down".to_string(),
            })
        }
    }

    fn employee_reply() -> serde_json::Value {
        serde_json::json!({
            "nodes": [
                { "id": "arjun", "type": "person", "properties": [
                    { "key": "role", "value": "employee" }
                ]},
                { "id": "python", "type": "SKILL", "properties": [] },
                { "id": "Arjun", "type": "Person", "properties": [
                    { "key": "role", "value": "ignored duplicate" },
                    { "key": "team", "value": "Billing" }
                ]}
            ],
            "relationships": [
                { "source_node_id": "arjun", "source_node_type": "person",
                  "target_node_id": "python", "target_node_type": "skill",
                  "type": "knows", "properties": [] },
                { "source_node_id": "arjun", "source_node_type": "person",
                  "target_node_id": "billing system", "target_node_type": "project",
                  "type": "works on", "properties": [] }
            ]
        })
    }

    #[tokio::test]
    async fn normalizes_ids_types_and_relationship_types() {
        let transformer = LlmGraphTransformer::new(CannedLlm::new(employee_reply()));
        let doc = transformer.convert_to_graph("Arjun knows Python.").await.unwrap();

        let ids: Vec<(&str, &str)> = doc
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.node_type.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("Arjun", "Person"),
                ("Python", "Skill"),
                ("Billing System", "Project"),
            ]
        );

        let rel_types: Vec<&str> = doc.relationships.iter().map(|r| r.rel_type.as_str()).collect();
        assert_eq!(rel_types, vec!["KNOWS", "WORKS_ON"]);
    }

    #[tokio::test]
    async fn duplicate_nodes_keep_first_properties_and_gain_new_ones() {
        let transformer = LlmGraphTransformer::new(CannedLlm::new(employee_reply()));
        let doc = transformer.convert_to_graph("text").await.unwrap();

        let arjun = &doc.nodes[0];
        assert_eq!(arjun.properties["role"], "employee");
        assert_eq!(arjun.properties["team"], "Billing");
    }

    #[tokio::test]
    async fn relationship_endpoints_are_backfilled_as_nodes() {
        let reply = serde_json::json!({
            "nodes": [],
            "relationships": [
                { "source_node_id": "Sneha", "source_node_type": "Person",
                  "target_node_id": "React", "target_node_type": "Skill",
                  "type": "SKILLED_IN", "properties": [] }
            ]
        });
        let transformer = LlmGraphTransformer::new(CannedLlm::new(reply));
        let doc = transformer.convert_to_graph("Sneha is skilled in React.").await.unwrap();

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0], GraphNode::new("Sneha", "Person"));
        assert_eq!(doc.nodes[1], GraphNode::new("React", "Skill"));
    }

    #[tokio::test]
    async fn strict_mode_drops_disallowed_types() {
        let transformer = LlmGraphTransformer::new(CannedLlm::new(employee_reply()))
            .with_allowed_nodes(vec!["person".to_string(), "Skill".to_string()])
            .with_allowed_relationships(vec!["KNOWS".to_string()]);
        let doc = transformer.convert_to_graph("text").await.unwrap();

        assert!(doc.nodes.iter().all(|n| n.node_type != "Project"));
        assert_eq!(doc.relationships.len(), 1);
        assert_eq!(doc.relationships[0].rel_type, "KNOWS");
    }

    #[tokio::test]
    async fn strict_mode_compares_non_ascii_types_case_insensitively() {
        let reply = serde_json::json!({
            "nodes": [ { "id": "Arjun", "type": "émployé", "properties": [] } ],
            "relationships": []
        });
        let transformer = LlmGraphTransformer::new(CannedLlm::new(reply))
            .with_allowed_nodes(vec!["émployé".to_string()]);
        let doc = transformer.convert_to_graph("text").await.unwrap();

        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].node_type, "Émployé");
    }

    #[tokio::test]
    async fn relaxed_mode_keeps_everything() {
        let transformer = LlmGraphTransformer::new(CannedLlm::new(employee_reply()))
            .with_allowed_nodes(vec!["Person".to_string()])
            .with_strict_mode(false);
        let doc = transformer.convert_to_graph("text").await.unwrap();

        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.relationships.len(), 2);
    }

    #[tokio::test]
    async fn allowed_types_reach_the_prompt() {
        let cfg = ExtractConfig {
            allowed_nodes: vec!["Person".to_string()],
            allowed_relationships: vec![],
            strict_mode: true,
        };
        let transformer = LlmGraphTransformer::from_config(CannedLlm::new(employee_reply()), &cfg);
        transformer.convert_to_graph("text").await.unwrap();

        let seen = transformer.client().seen.borrow();
        assert!(seen[0].content.contains("Allowed node types: Person."));
    }

    #[tokio::test]
    async fn source_records_text_and_model() {
        let transformer = LlmGraphTransformer::new(CannedLlm::new(employee_reply()));
        let doc = transformer.convert_to_graph("Arjun knows Python.").await.unwrap();

        assert_eq!(doc.source.page_content, "Arjun knows Python.");
        assert_eq!(doc.source.metadata["model"], "canned-model");
        assert!(doc.source.metadata.contains_key("extracted_at"));
        assert_eq!(doc.source.id, SourceDocument::from_text("Arjun knows Python.").id);
    }

    #[tokio::test]
    async fn blank_entries_are_dropped() {
        let reply = serde_json::json!({
            "nodes": [ { "id": "  ", "type": "Person", "properties": [] } ],
            "relationships": [
                { "source_node_id": "A", "source_node_type": "Person",
                  "target_node_id": "B", "target_node_type": "Person",
                  "type": "  ", "properties": [] }
            ]
        });
        let transformer = LlmGraphTransformer::new(CannedLlm::new(reply));
        let doc = transformer.convert_to_graph("text").await.unwrap();
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn malformed_reply_is_a_parse_error() {
        let transformer = LlmGraphTransformer::new(CannedLlm::raw("not json at all"));
        let err = transformer.convert_to_graph("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[tokio::test]
    async fn client_errors_propagate() {
        let transformer = LlmGraphTransformer::new(FailingLlm);
        let err = transformer.convert_to_graph("text").await.unwrap_err();
        assert!(matches!(err, ExtractError::Api { status: 500, .. }));
    }

    #[test]
    fn casing_helpers() {
        assert_eq!(title_case("billing  system"), "Billing System");
        assert_eq!(title_case("UI team"), "UI Team");
        assert_eq!(capitalize("PROGRAMMING"), "Programming");
        assert_eq!(normalize_rel_type("works-on team").as_deref(), Some("WORKS_ON_TEAM"));
        assert_eq!(normalize_rel_type(" "), None);
    }
}
