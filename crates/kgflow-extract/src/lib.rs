//! kgflow-extract: LLM-driven entity and relation extraction.
//!
//! [`LlmGraphTransformer`] prompts a chat model for nodes and relationships
//! under a strict JSON schema and turns the reply into a
//! [`kgflow_core::GraphDocument`]. [`OpenAiClient`] is the production
//! [`LlmClient`].

pub mod error;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod transformer;

pub use error::ExtractError;
pub use llm::{LlmClient, Message, ResponseSchema, Role};
pub use openai::OpenAiClient;
pub use transformer::{GraphExtractor, LlmGraphTransformer};
