//! Export record shapes and their conversion into [`Node`]s.
//!
//! Exports are loose: numbers show up as floats (`1.542072143141e+12`),
//! fields go missing or `null`, and the `children` / `parents` maps carry a
//! `_key` bookkeeping entry next to the real references.

use crate::IngestError;
use cdmigrate_model::node::timestamp_from_millis;
use cdmigrate_model::{ArgumentType, ChildRef, Node, NodeType, Polarity, SourceGraph, TitleSet};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const BOOKKEEPING_KEY: &str = "_key";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTitles {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    negation: Option<String>,
    #[serde(rename = "yesNoQuestion", default)]
    question: Option<String>,
}

impl RawTitles {
    fn into_title_set(self) -> TitleSet {
        TitleSet {
            base: self.base.unwrap_or_default(),
            negation: self.negation.unwrap_or_default(),
            question: self.question.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCurrent {
    #[serde(default)]
    titles: Option<RawTitles>,
    #[serde(rename = "argumentType", default)]
    argument_type: Option<Value>,
    #[serde(default)]
    node: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNode {
    #[serde(rename = "_key", default)]
    key: Option<String>,
    #[serde(rename = "createdAt", default)]
    created_at: Option<Value>,
    #[serde(default)]
    creator: Option<String>,
    #[serde(rename = "type", default)]
    node_type: Option<Value>,
    #[serde(default)]
    current: Option<RawCurrent>,
    #[serde(rename = "currentRevision", default)]
    current_revision: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    polarity: Option<Value>,
    #[serde(rename = "multiPremiseArgument", default)]
    multi_premise: Option<bool>,
    #[serde(default)]
    parents: Option<Map<String, Value>>,
    #[serde(default)]
    children: Option<Map<String, Value>>,
    #[serde(rename = "childrenOrder", default)]
    children_order: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawRevision {
    #[serde(rename = "_key")]
    key: String,
    #[serde(default)]
    titles: Option<RawTitles>,
}

#[derive(Debug, Deserialize)]
struct RawMap {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "rootNode", default)]
    root_node: Option<String>,
}

/// Integer code from a JSON number that may have been written as a float.
fn number_code(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Decode a raw `children` map into typed references.
pub fn decode_children(raw: &Map<String, Value>) -> BTreeMap<String, ChildRef> {
    let mut out = BTreeMap::new();
    for (map_key, entry) in raw {
        if map_key == BOOKKEEPING_KEY {
            continue;
        }
        let child = match entry {
            Value::Object(fields) => {
                let id = non_empty(fields.get("_key").and_then(Value::as_str))
                    .unwrap_or(map_key.as_str());
                let polarity = fields
                    .get("polarity")
                    .and_then(number_code)
                    .and_then(Polarity::from_code);
                ChildRef::new(id, polarity)
            }
            _ => ChildRef::unpolarized(map_key.as_str()),
        };
        out.insert(child.id.clone(), child);
    }
    out
}

fn decode_parents(raw: &Map<String, Value>) -> BTreeSet<String> {
    raw.keys()
        .filter(|k| k.as_str() != BOOKKEEPING_KEY)
        .cloned()
        .collect()
}

impl RawNode {
    fn into_node(
        self,
        index: usize,
        revisions: &BTreeMap<String, TitleSet>,
    ) -> Result<Node, IngestError> {
        let current = self.current.unwrap_or_default();

        let id = non_empty(self.key.as_deref())
            .or_else(|| non_empty(current.node.as_deref()))
            .map(str::to_string)
            .ok_or(IngestError::MissingId { index })?;

        let type_value = self.node_type.unwrap_or(Value::Null);
        let node_type = number_code(&type_value)
            .and_then(NodeType::from_code)
            .ok_or_else(|| IngestError::UnknownNodeType {
                id: id.clone(),
                code: type_value.to_string(),
            })?;

        let titles = match self
            .current_revision
            .as_deref()
            .and_then(|rev| revisions.get(rev))
        {
            Some(titles) => titles.clone(),
            None => current
                .titles
                .map(RawTitles::into_title_set)
                .unwrap_or_default(),
        };

        let mut node = Node::new(id, node_type);
        node.created_at = timestamp_from_millis(
            self.created_at.as_ref().and_then(number_code).unwrap_or(0),
        );
        node.creator = self.creator.unwrap_or_default();
        node.titles = titles;
        node.argument_type = current
            .argument_type
            .as_ref()
            .and_then(number_code)
            .and_then(ArgumentType::from_code);
        node.note = self.note.unwrap_or_default();
        node.polarity = self
            .polarity
            .as_ref()
            .and_then(number_code)
            .and_then(Polarity::from_code);
        // Only arguments are multi-premise in the export.
        node.multi_premise =
            node_type == NodeType::Argument && self.multi_premise.unwrap_or(false);
        node.parents = self.parents.as_ref().map(decode_parents).unwrap_or_default();
        node.children = self
            .children
            .as_ref()
            .map(decode_children)
            .unwrap_or_default();
        node.children_order = self.children_order.unwrap_or_default();
        Ok(node)
    }
}

pub(crate) fn nodes_from_value(doc: Value) -> Result<Vec<RawNode>, IngestError> {
    let Value::Array(items) = doc else {
        return Err(IngestError::UnrecognizedShape {
            found: "node list is not an array",
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawNode>(item).map_err(|e| IngestError::MalformedNode {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

pub(crate) fn convert_nodes(
    raw_nodes: Vec<RawNode>,
    revisions: &BTreeMap<String, TitleSet>,
) -> Result<Vec<Node>, IngestError> {
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (index, raw) in raw_nodes.into_iter().enumerate() {
        let node = raw.into_node(index, revisions)?;
        tracing::debug!(
            id = %node.id,
            node_type = %node.node_type,
            children = node.children.len(),
            "decoded node"
        );
        nodes.push(node);
    }
    Ok(nodes)
}

/// Look a section up on the root object, falling back to `general.<name>`.
fn section(root: &mut Map<String, Value>, name: &str) -> Option<Value> {
    if let Some(v) = root.remove(name) {
        return Some(v);
    }
    root.get_mut("general")
        .and_then(Value::as_object_mut)
        .and_then(|general| general.remove(name))
}

pub(crate) fn decode_general(doc: Value) -> Result<SourceGraph, IngestError> {
    let Value::Object(mut root) = doc else {
        return Err(IngestError::UnrecognizedShape {
            found: "general export is not an object",
        });
    };

    let mut revisions: BTreeMap<String, TitleSet> = BTreeMap::new();
    if let Some(Value::Array(items)) = section(&mut root, "nodeRevisions") {
        for item in items {
            match serde_json::from_value::<RawRevision>(item) {
                Ok(rev) => {
                    let titles = rev
                        .titles
                        .map(RawTitles::into_title_set)
                        .unwrap_or_default();
                    revisions.insert(rev.key, titles);
                }
                Err(err) => tracing::warn!(error = %err, "skipping unreadable node revision"),
            }
        }
    }

    let mut map_names: BTreeMap<String, String> = BTreeMap::new();
    if let Some(Value::Array(items)) = section(&mut root, "maps") {
        for item in items {
            match serde_json::from_value::<RawMap>(item) {
                Ok(RawMap {
                    name: Some(name),
                    root_node: Some(root_node),
                }) => {
                    map_names.insert(root_node, name);
                }
                Ok(_) => tracing::debug!("skipping map without name or root node"),
                Err(err) => tracing::warn!(error = %err, "skipping unreadable map"),
            }
        }
    }

    let raw_nodes = match section(&mut root, "nodes") {
        Some(value) => nodes_from_value(value)?,
        None => Vec::new(),
    };
    let nodes = convert_nodes(raw_nodes, &revisions)?;

    Ok(SourceGraph { nodes, map_names })
}
