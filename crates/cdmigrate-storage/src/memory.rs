//! In-process document store.

use crate::{value_kind, CollectionKind, DocumentMeta, DocumentStore, StoreError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Collection {
    kind: CollectionKind,
    documents: BTreeMap<String, Map<String, Value>>,
}

/// BTreeMap-backed store with ArangoDB-like create/update semantics.
///
/// Documents without a `_key` get a sequential one. Updates merge top-level
/// fields, like an HTTP PATCH.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Collection>,
    next_key: u64,
    revision: u64,
    writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection_kind(&self, name: &str) -> Option<CollectionKind> {
        self.collections.get(name).map(|c| c.kind)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.collections
            .get(collection)?
            .documents
            .get(key)
            .cloned()
            .map(Value::Object)
    }

    /// All documents of a collection, ordered by key.
    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|c| c.documents.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Documents whose `field` equals `value`.
    pub fn find_by(&self, collection: &str, field: &str, value: &Value) -> Vec<Value> {
        self.documents(collection)
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect()
    }

    /// Number of create/update calls served.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn next_rev(&mut self) -> String {
        self.revision += 1;
        format!("_r{}", self.revision)
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, StoreError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn open_collection(
        &mut self,
        name: &str,
        kind: CollectionKind,
        truncate: bool,
    ) -> Result<(), StoreError> {
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| Collection {
                kind,
                documents: BTreeMap::new(),
            });
        if truncate {
            collection.documents.clear();
        }
        Ok(())
    }

    fn create_document(
        &mut self,
        collection: &str,
        doc: &Value,
    ) -> Result<DocumentMeta, StoreError> {
        let Value::Object(fields) = doc else {
            return Err(StoreError::NotAnObject(value_kind(doc)));
        };
        let mut fields = fields.clone();

        let key = match fields.get("_key").and_then(Value::as_str) {
            Some(key) => key.to_string(),
            None => {
                self.next_key += 1;
                self.next_key.to_string()
            }
        };
        let rev = self.next_rev();
        let id = format!("{collection}/{key}");
        fields.insert("_key".to_string(), Value::String(key.clone()));
        fields.insert("_id".to_string(), Value::String(id.clone()));
        fields.insert("_rev".to_string(), Value::String(rev.clone()));

        let target = self.collection_mut(collection)?;
        if target.documents.contains_key(&key) {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                key,
            });
        }
        target.documents.insert(key.clone(), fields);
        self.writes += 1;
        Ok(DocumentMeta { id, key, rev })
    }

    fn update_document(
        &mut self,
        collection: &str,
        key: &str,
        patch: &Value,
    ) -> Result<DocumentMeta, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject(value_kind(patch)));
        };
        let rev = self.next_rev();
        let target = self.collection_mut(collection)?;
        let doc = target
            .documents
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;
        for (field, value) in patch {
            if field == "_key" || field == "_id" {
                continue;
            }
            doc.insert(field.clone(), value.clone());
        }
        doc.insert("_rev".to_string(), Value::String(rev.clone()));
        self.writes += 1;
        Ok(DocumentMeta {
            id: format!("{collection}/{key}"),
            key: key.to_string(),
            rev,
        })
    }
}
