//! Debate-map export ingestion
//!
//! Two export dialects are accepted:
//!
//! - **nodes**: a flat JSON array of node records
//!   (`[{"children": {...}, "_key": ..., "type": 40, ...}, ...]`);
//! - **general**: a root object with a `general` field, whose `nodes`,
//!   `nodeRevisions` and `maps` arrays carry the nodes, the title revisions
//!   the nodes point at, and the human-readable names bound to map roots.
//!
//! Anything else is rejected before any store I/O happens. The untyped
//! `children` / `parents` maps are decoded here, once, into
//! [`cdmigrate_model::ChildRef`]s.

mod raw;

use cdmigrate_model::SourceGraph;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use raw::decode_children;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Nodes,
    General,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::General => "general",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized input shape ({found}); expected a node array or a `general` export")]
    UnrecognizedShape { found: &'static str },

    #[error("node #{index}: {message}")]
    MalformedNode { index: usize, message: String },

    #[error("node {id}: unknown node type {code}")]
    UnknownNodeType { id: String, code: String },

    #[error("node #{index} has neither `_key` nor `current.node`")]
    MissingId { index: usize },
}

/// Result of decoding one input document.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub dialect: Dialect,
    pub graph: SourceGraph,
}

/// Classify a parsed document without decoding it.
pub fn detect_dialect(doc: &Value) -> Result<Dialect, IngestError> {
    match doc {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) if looks_like_node(first) => Ok(Dialect::Nodes),
            Some(_) => Err(IngestError::UnrecognizedShape {
                found: "array of non-node values",
            }),
            None => Err(IngestError::UnrecognizedShape {
                found: "empty array",
            }),
        },
        Value::Object(root) if root.contains_key("general") => Ok(Dialect::General),
        Value::Object(_) => Err(IngestError::UnrecognizedShape {
            found: "object without `general`",
        }),
        Value::Null => Err(IngestError::UnrecognizedShape { found: "null" }),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Err(IngestError::UnrecognizedShape { found: "scalar" })
        }
    }
}

fn looks_like_node(obj: &serde_json::Map<String, Value>) -> bool {
    obj.contains_key("children") || obj.contains_key("type")
}

/// Parse and decode a document held in memory.
pub fn parse_document(text: &str) -> Result<LoadedDocument, IngestError> {
    let doc: Value = serde_json::from_str(text)?;
    decode_document(doc)
}

/// Decode an already-parsed document.
pub fn decode_document(doc: Value) -> Result<LoadedDocument, IngestError> {
    let dialect = detect_dialect(&doc)?;
    tracing::info!(dialect = dialect.as_str(), "detected input dialect");

    let graph = match dialect {
        Dialect::Nodes => {
            let raw_nodes = raw::nodes_from_value(doc)?;
            let nodes = raw::convert_nodes(raw_nodes, &BTreeMap::new())?;
            SourceGraph::new(nodes)
        }
        Dialect::General => raw::decode_general(doc)?,
    };

    tracing::info!(
        nodes = graph.nodes.len(),
        maps = graph.map_names.len(),
        "decoded input document"
    );
    Ok(LoadedDocument { dialect, graph })
}

/// Read, parse and decode a file.
pub fn load_path(path: &Path) -> Result<LoadedDocument, IngestError> {
    tracing::info!(path = %path.display(), "loading input file");
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}
