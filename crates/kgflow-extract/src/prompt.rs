//! Prompt text and response schema for graph extraction.

use serde_json::{json, Value};

use crate::llm::{Message, ResponseSchema};

const BASE_INSTRUCTIONS: &str = "\
You extract structured information from text to build a knowledge graph.
Capture as much information from the text as possible without adding anything \
that is not stated in it.

Nodes are entities and concepts. Relationships connect two nodes.

- Node ids are names or human-readable identifiers found in the text. Never use \
integers or generated ids.
- Node types are basic, general categories: use \"Person\" for any human, not \
\"Employee\" or \"Engineer\".
- Relationship types are general and timeless: prefer \"WORKS_ON\" over \
\"STARTED_WORKING_ON\".
- When an entity is mentioned several times under different names or pronouns, \
always use its most complete name as the id.
- Only list properties that are explicitly stated in the text.";

/// Build the system prompt, listing allowed types when restricted.
pub fn system_prompt(allowed_nodes: &[String], allowed_relationships: &[String]) -> String {
    let mut prompt = BASE_INSTRUCTIONS.to_string();
    if !allowed_nodes.is_empty() {
        prompt.push_str(&format!(
            "\n- Allowed node types: {}. Do not use any other node type.",
            allowed_nodes.join(", ")
        ));
    }
    if !allowed_relationships.is_empty() {
        prompt.push_str(&format!(
            "\n- Allowed relationship types: {}. Do not use any other relationship type.",
            allowed_relationships.join(", ")
        ));
    }
    prompt
}

/// The full conversation for one extraction call.
pub fn extraction_messages(
    text: &str,
    allowed_nodes: &[String],
    allowed_relationships: &[String],
) -> Vec<Message> {
    vec![
        Message::system(system_prompt(allowed_nodes, allowed_relationships)),
        Message::user(format!(
            "Extract the knowledge graph from the following input. \
             Use the required output format.\n\nInput:\n{text}"
        )),
    ]
}

fn property_list_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "value": { "type": "string" }
            },
            "required": ["key", "value"],
            "additionalProperties": false
        }
    })
}

/// Schema for the model reply. Strict mode requires every field be listed
/// under `required` and `additionalProperties` be false.
pub fn graph_schema() -> ResponseSchema {
    let properties = property_list_schema();
    ResponseSchema {
        name: "knowledge_graph".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "nodes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "type": { "type": "string" },
                            "properties": properties
                        },
                        "required": ["id", "type", "properties"],
                        "additionalProperties": false
                    }
                },
                "relationships": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "source_node_id": { "type": "string" },
                            "source_node_type": { "type": "string" },
                            "target_node_id": { "type": "string" },
                            "target_node_type": { "type": "string" },
                            "type": { "type": "string" },
                            "properties": properties
                        },
                        "required": [
                            "source_node_id",
                            "source_node_type",
                            "target_node_id",
                            "target_node_type",
                            "type",
                            "properties"
                        ],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["nodes", "relationships"],
            "additionalProperties": false
        }),
    }
}
