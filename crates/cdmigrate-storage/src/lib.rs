//! Store access for migration runs
//!
//! The migration only ever needs four things from a document/graph store:
//!
//! ```text
//!   open_collection(name, kind, truncate)   ensure + optionally empty
//!   create_document(collection, doc)        insert, returns key/id/rev
//!   update_document(collection, key, doc)   merge top-level fields
//! ```
//!
//! [`DocumentStore`] captures exactly that. Two implementations ship:
//!
//! - [`MemoryStore`]: in-process, used by tests and `--dry-run`;
//! - [`ArangoStore`]: ArangoDB over its HTTP API.
//!
//! Calls are issued one at a time; nothing is batched or retried.

pub mod arango;
pub mod memory;


use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use arango::ArangoStore;
pub use memory::MemoryStore;

/// Whether a collection holds vertices (documents) or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    Document,
    Edge,
}

impl CollectionKind {
    /// ArangoDB's numeric collection type.
    pub fn arango_type(self) -> u8 {
        match self {
            Self::Document => 2,
            Self::Edge => 3,
        }
    }
}

/// Identity of a stored document, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_rev", default)]
    pub rev: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store endpoint `{endpoint}`: {message}")]
    Endpoint { endpoint: String, message: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{context}: http {status}: {body}")]
    Http {
        context: String,
        status: u16,
        body: String,
    },

    #[error("collection `{0}` is not open")]
    UnknownCollection(String),

    #[error("document `{collection}/{key}` not found")]
    NotFound { collection: String, key: String },

    #[error("document `{collection}/{key}` already exists")]
    Conflict { collection: String, key: String },

    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Minimal document-store surface a migration run writes through.
pub trait DocumentStore {
    /// Make sure `name` exists (creating it with `kind` if needed); empty it
    /// when `truncate` is set.
    fn open_collection(
        &mut self,
        name: &str,
        kind: CollectionKind,
        truncate: bool,
    ) -> Result<(), StoreError>;

    fn create_document(&mut self, collection: &str, doc: &Value)
        -> Result<DocumentMeta, StoreError>;

    /// Merge the top-level fields of `patch` into the stored document.
    fn update_document(
        &mut self,
        collection: &str,
        key: &str,
        patch: &Value,
    ) -> Result<DocumentMeta, StoreError>;
}

/// Connection settings for the ArangoDB store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// e.g. `http://localhost:8529`
    pub server: String,
    pub database: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8529".to_string(),
            database: "canonical_debate".to_string(),
            username: "root".to_string(),
            password: String::new(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
