//! Configuration management for kgflow.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (KGFLOW_ prefix, `__` section separator)
//! 2. Config file (kgflow.toml)
//! 3. Defaults

use serde::Deserialize;

use crate::error::KgflowError;

/// Top-level configuration, one field per `[section]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KgflowConfig {
    #[serde(default)]
    pub neo4j: Neo4jConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Graph store connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,

    #[serde(default = "default_neo4j_user")]
    pub user: String,

    #[serde(default = "default_neo4j_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Language-model endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub temperature: f32,
}

/// Controls for the LLM graph transformer.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Node types the model may emit. Empty means unrestricted.
    #[serde(default)]
    pub allowed_nodes: Vec<String>,

    /// Relationship types the model may emit. Empty means unrestricted.
    #[serde(default)]
    pub allowed_relationships: Vec<String>,

    /// Drop anything outside the allowed lists after extraction.
    #[serde(default = "default_true")]
    pub strict_mode: bool,
}

/// Controls for writing graph documents into the store.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Link every node to a `Document` node holding the source text.
    #[serde(default)]
    pub include_source: bool,

    /// Add an `__Entity__` label to every node and merge on it.
    #[serde(default)]
    pub base_entity_label: bool,
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "password".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: 0.0,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            allowed_nodes: Vec::new(),
            allowed_relationships: Vec::new(),
            strict_mode: default_true(),
        }
    }
}

impl KgflowConfig {
    /// Load `<file_prefix>.toml` (optional) overlaid with `KGFLOW_*` env vars.
    pub fn load(file_prefix: &str) -> Result<Self, KgflowError> {
        Self::load_with_env(file_prefix, config::Environment::with_prefix("KGFLOW"))
    }

    /// Load with an explicit environment source.
    pub fn load_with_env(
        file_prefix: &str,
        env: config::Environment,
    ) -> Result<Self, KgflowError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extract.allowed_nodes")
                    .with_list_parse_key("extract.allowed_relationships"),
            )
            .build()?;

        let loaded: KgflowConfig = cfg.try_deserialize()?;
        tracing::debug!(
            file_prefix,
            neo4j_uri = %loaded.neo4j.uri,
            model = %loaded.llm.model,
            "Configuration loaded"
        );
        Ok(loaded)
    }
}
