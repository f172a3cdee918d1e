//! Source-side node model.
//!
//! A debate-map export stores every node in one generic shape: categories,
//! packages, questions, claims and arguments all share the same record and are
//! linked through untyped `parents` / `children` maps. Ingestion decodes those
//! maps once into [`ChildRef`]s; nothing downstream looks at raw JSON again.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// The five node kinds of the source graph (integer codes in the export).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Category,
    Package,
    Question,
    Claim,
    Argument,
}

impl NodeType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10 => Some(Self::Category),
            20 => Some(Self::Package),
            30 => Some(Self::Question),
            40 => Some(Self::Claim),
            50 => Some(Self::Argument),
            _ => None,
        }
    }

    /// Category/Package/Question: structural nodes with no canonical counterpart.
    pub fn is_placeholder(self) -> bool {
        matches!(self, Self::Category | Self::Package | Self::Question)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Package => "package",
            Self::Question => "question",
            Self::Claim => "claim",
            Self::Argument => "argument",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared polarity of a child relative to its parent.
///
/// Codes other than 10/20 (including 0) mean "unset" and decode to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Pro,
    Con,
}

impl Polarity {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10 => Some(Self::Pro),
            20 => Some(Self::Con),
            _ => None,
        }
    }

    pub fn is_pro(self) -> bool {
        self == Self::Pro
    }
}

/// How the premises of a multi-premise argument combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Any,
    AnyTwo,
    All,
}

impl ArgumentType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10 => Some(Self::Any),
            15 => Some(Self::AnyTwo),
            20 => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSet {
    pub base: String,
    pub negation: String,
    pub question: String,
}

/// One decoded entry of a node's `children` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub id: String,
    pub polarity: Option<Polarity>,
}

impl ChildRef {
    pub fn new(id: impl Into<String>, polarity: Option<Polarity>) -> Self {
        Self {
            id: id.into(),
            polarity,
        }
    }

    pub fn unpolarized(id: impl Into<String>) -> Self {
        Self::new(id, None)
    }
}

/// One source node after ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub node_type: NodeType,
    pub created_at: DateTime<Utc>,
    pub creator: String,
    pub titles: TitleSet,
    pub argument_type: Option<ArgumentType>,
    pub note: String,
    pub polarity: Option<Polarity>,
    /// Only meaningful on Argument nodes.
    pub multi_premise: bool,
    pub parents: BTreeSet<String>,
    pub children: BTreeMap<String, ChildRef>,
    /// Premise display order for multi-premise nodes.
    pub children_order: Vec<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            created_at: epoch(),
            creator: String::new(),
            titles: TitleSet::default(),
            argument_type: None,
            note: String::new(),
            polarity: None,
            multi_premise: false,
            parents: BTreeSet::new(),
            children: BTreeMap::new(),
            children_order: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.node_type.is_placeholder()
    }

    pub fn is_multi_premise_argument(&self) -> bool {
        self.node_type == NodeType::Argument && self.multi_premise
    }

    pub fn has_parent(&self) -> bool {
        !self.parents.is_empty()
    }

    pub fn add_child(&mut self, child: ChildRef) {
        self.children.insert(child.id.clone(), child);
    }

    /// 1-indexed position of `child_id` in `children_order`, 0 when absent.
    pub fn child_order(&self, child_id: &str) -> u32 {
        self.children_order
            .iter()
            .position(|id| id == child_id)
            .map(|idx| idx as u32 + 1)
            .unwrap_or(0)
    }

    /// Children in display order: those named by `children_order` first (in
    /// that order), then the rest by id.
    pub fn ordered_children(&self) -> Vec<&ChildRef> {
        let mut out: Vec<&ChildRef> = Vec::with_capacity(self.children.len());
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for id in &self.children_order {
            if let Some(child) = self.children.get(id) {
                if seen.insert(child.id.as_str()) {
                    out.push(child);
                }
            }
        }
        for (id, child) in &self.children {
            if !seen.contains(id.as_str()) {
                out.push(child);
            }
        }
        out
    }
}

/// Everything a migration run needs from the input document.
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    pub nodes: Vec<Node>,
    /// Human-readable map names keyed by the map's root node id.
    pub map_names: BTreeMap<String, String>,
}

impl SourceGraph {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            map_names: BTreeMap::new(),
        }
    }
}

/// Millisecond timestamps as stored in the export.
pub fn timestamp_from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(epoch)
}

pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}
