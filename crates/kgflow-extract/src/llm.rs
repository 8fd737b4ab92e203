//! LLM client abstraction.
//!
//! The transformer only needs one capability: send a conversation plus a
//! JSON schema, get back the JSON text the model produced.

use serde::Serialize;

use crate::error::Result;

/// A chat message for the LLM conversation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Speaker role in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A named JSON schema the response must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Trait for LLM clients supporting structured (JSON schema) output.
#[allow(async_fn_in_trait)]
pub trait LlmClient {
    /// Model identifier, recorded as extraction provenance.
    fn model(&self) -> &str;

    /// Send the conversation and return the raw JSON text of the reply.
    async fn generate_structured(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<String>;
}
