//! Bolt connection to the store that graph documents are written into and
//! sample rows are read back from.

use kgflow_core::Neo4jConfig;
use neo4rs::{ConfigBuilder, Graph, Query, Row, Txn};

/// Failures talking to the graph store.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The server could not be reached or refused the credentials.
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    /// A returned value has no JSON counterpart.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Connection settings, derived from the `[neo4j]` config section.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::from(&Neo4jConfig::default())
    }
}

impl From<&Neo4jConfig> for GraphConfig {
    fn from(cfg: &Neo4jConfig) -> Self {
        Self {
            uri: cfg.uri.clone(),
            user: cfg.user.clone(),
            password: cfg.password.clone(),
            max_connections: cfg.max_connections,
            fetch_size: cfg.fetch_size,
        }
    }
}

/// The pipeline's handle on Neo4j.
///
/// The ingestion step writes through [`GraphClient::add_graph_document`] and
/// the query step reads through [`GraphClient::read_rows`]; both sit on the
/// three primitives below.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Open a connection to the configured server.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let connection_error =
            |e: neo4rs::Error| GraphError::Connection(format!("{}: {e}", config.uri));

        let bolt = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(connection_error)?;
        let graph = Graph::connect(bolt).await.map_err(connection_error)?;

        tracing::info!(uri = %config.uri, user = %config.user, "Connected to graph store");
        Ok(Self { graph })
    }

    /// Run a statement outside any explicit transaction, discarding rows.
    pub async fn run(&self, statement: Query) -> Result<(), GraphError> {
        self.graph.run(statement).await?;
        Ok(())
    }

    /// Stream every row of a read, keeping the server's order.
    pub async fn query_rows(&self, read: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(read).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        tracing::debug!(rows = rows.len(), "Read complete");
        Ok(rows)
    }

    /// Open the write transaction one graph document is committed in.
    pub async fn start_txn(&self) -> Result<Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
