//! Read operations: run a Cypher read and flatten rows into JSON maps.

use kgflow_core::ResultRow;
use neo4rs::query;
use serde_json::{Map, Value};

use crate::client::{GraphClient, GraphError};

/// A read query together with the columns it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadQuery {
    pub cypher: &'static str,
    pub columns: &'static [&'static str],
}

impl GraphClient {
    /// Run a read query and return one flat map per row, in return order.
    pub async fn read_rows(&self, read: &ReadQuery) -> Result<Vec<ResultRow>, GraphError> {
        let rows = self.query_rows(query(read.cypher)).await?;
        rows.iter()
            .map(|row| row_to_record(row, read.columns))
            .collect()
    }
}

fn row_to_record(row: &neo4rs::Row, columns: &[&str]) -> Result<ResultRow, GraphError> {
    let mut record = ResultRow::new();
    for column in columns {
        record.insert((*column).to_string(), column_value(row, column)?);
    }
    Ok(record)
}

/// Decode one column. Nodes become the map of their properties.
fn column_value(row: &neo4rs::Row, column: &str) -> Result<Value, GraphError> {
    if let Ok(node) = row.get::<neo4rs::Node>(column) {
        return Ok(Value::Object(node_properties(&node)));
    }
    if let Ok(v) = row.get::<bool>(column) {
        return Ok(Value::Bool(v));
    }
    if let Ok(v) = row.get::<i64>(column) {
        return Ok(Value::from(v));
    }
    if let Ok(v) = row.get::<f64>(column) {
        return Ok(Value::from(v));
    }
    if let Ok(v) = row.get::<String>(column) {
        return Ok(Value::String(v));
    }
    if let Ok(v) = row.get::<Vec<String>>(column) {
        return Ok(Value::from(v));
    }
    if let Ok(v) = row.get::<Option<String>>(column) {
        return Ok(v.map(Value::String).unwrap_or(Value::Null));
    }
    Err(GraphError::Serialization(format!(
        "Unsupported value in column {column}"
    )))
}

/// Collect every property of a node whose value has a JSON counterpart.
fn node_properties(node: &neo4rs::Node) -> Map<String, Value> {
    let mut props = Map::new();
    for key in node.keys() {
        if let Some(value) = node_property(node, key) {
            props.insert(key.to_string(), value);
        } else {
            tracing::debug!(key, "Skipping node property with unsupported type");
        }
    }
    props
}

fn node_property(node: &neo4rs::Node, key: &str) -> Option<Value> {
    if let Ok(v) = node.get::<bool>(key) {
        return Some(Value::Bool(v));
    }
    if let Ok(v) = node.get::<i64>(key) {
        return Some(Value::from(v));
    }
    if let Ok(v) = node.get::<f64>(key) {
        return Some(Value::from(v));
    }
    if let Ok(v) = node.get::<String>(key) {
        return Some(Value::String(v));
    }
    if let Ok(v) = node.get::<Vec<String>>(key) {
        return Some(Value::from(v));
    }
    if let Ok(v) = node.get::<Vec<i64>>(key) {
        return Some(Value::from(v));
    }
    if let Ok(v) = node.get::<Vec<f64>>(key) {
        return Some(Value::from(v));
    }
    if let Ok(v) = node.get::<Vec<bool>>(key) {
        return Some(Value::from(v));
    }
    None
}
