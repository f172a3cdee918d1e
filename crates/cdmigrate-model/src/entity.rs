//! Canonical vertices: [`Claim`] and [`Argument`].
//!
//! Field names on the wire follow the canonical-debate database schema, which
//! is why most fields carry a `serde(rename)`.

use crate::collections;
use crate::ids::IdAllocator;
use crate::node::{ArgumentType, Node};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const DEFAULT_TRUTH: f32 = 0.5;
pub const DEFAULT_RELEVANCE: f32 = 1.0;
pub const DEFAULT_STRENGTH: f32 = 0.5;

/// A record stored in one of the vertex collections.
pub trait Vertex {
    const COLLECTION: &'static str;

    fn key(&self) -> &str;

    /// `"<collection>/<key>"`, the form edges use for `_from` / `_to`.
    fn handle(&self) -> String {
        format!("{}/{}", Self::COLLECTION, self.key())
    }
}

/// Combination rule for the premises of a multi-premise claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PremiseRule {
    #[default]
    None,
    All,
    Any,
    AnyTwo,
}

impl PremiseRule {
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::Any => 2,
            Self::AnyTwo => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::All),
            2 => Some(Self::Any),
            3 => Some(Self::AnyTwo),
            _ => None,
        }
    }
}

impl From<Option<ArgumentType>> for PremiseRule {
    fn from(value: Option<ArgumentType>) -> Self {
        match value {
            Some(ArgumentType::Any) => Self::Any,
            Some(ArgumentType::AnyTwo) => Self::AnyTwo,
            Some(ArgumentType::All) => Self::All,
            None => Self::None,
        }
    }
}

impl Serialize for PremiseRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for PremiseRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown premise rule {code}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "_key")]
    pub key: String,
    pub id: String,
    #[serde(rename = "start")]
    pub created_at: DateTime<Utc>,
    pub creator: String,
    pub title: String,
    pub negation: String,
    pub question: String,
    pub note: String,
    #[serde(rename = "mp")]
    pub multi_premise: bool,
    #[serde(rename = "mprule")]
    pub premise_rule: PremiseRule,
    pub truth: f32,
    #[serde(
        rename = "childrenOrder",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children_order: Vec<String>,
}

impl Vertex for Claim {
    const COLLECTION: &'static str = collections::CLAIMS;

    fn key(&self) -> &str {
        &self.key
    }
}

/// What an argument infers something about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentTarget {
    Claim(String),
    Argument(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(rename = "_key")]
    pub key: String,
    pub id: String,
    #[serde(rename = "start")]
    pub created_at: DateTime<Utc>,
    pub creator: String,
    #[serde(
        rename = "targetClaimId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_claim_id: Option<String>,
    #[serde(
        rename = "targetArgId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_argument_id: Option<String>,
    #[serde(rename = "claimId", default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<String>,
    pub title: String,
    pub negation: String,
    pub question: String,
    pub note: String,
    pub pro: bool,
    pub relevance: f32,
    pub strength: f32,
}

impl Argument {
    pub fn target(&self) -> Option<ArgumentTarget> {
        match (&self.target_claim_id, &self.target_argument_id) {
            (Some(id), _) => Some(ArgumentTarget::Claim(id.clone())),
            (None, Some(id)) => Some(ArgumentTarget::Argument(id.clone())),
            (None, None) => None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.target().is_some()
    }
}

impl Vertex for Argument {
    const COLLECTION: &'static str = collections::ARGUMENTS;

    fn key(&self) -> &str {
        &self.key
    }
}

pub fn new_claim(node: &Node, ids: &mut dyn IdAllocator) -> Claim {
    Claim {
        key: ids.fresh(),
        id: node.id.clone(),
        created_at: node.created_at,
        creator: node.creator.clone(),
        title: node.titles.base.clone(),
        negation: node.titles.negation.clone(),
        question: node.titles.question.clone(),
        note: node.note.clone(),
        multi_premise: node.multi_premise,
        premise_rule: PremiseRule::from(node.argument_type),
        truth: DEFAULT_TRUTH,
        children_order: node.children_order.clone(),
    }
}

/// A provisional argument: no polarity, target or base claim yet.
pub fn new_argument(node: &Node, ids: &mut dyn IdAllocator) -> Argument {
    Argument {
        key: ids.fresh(),
        id: node.id.clone(),
        created_at: node.created_at,
        creator: node.creator.clone(),
        target_claim_id: None,
        target_argument_id: None,
        claim_id: None,
        title: node.titles.base.clone(),
        negation: node.titles.negation.clone(),
        question: node.titles.question.clone(),
        note: node.note.clone(),
        pro: false,
        relevance: DEFAULT_RELEVANCE,
        strength: DEFAULT_STRENGTH,
    }
}

/// Linkage fields an argument picks up during edge construction.
///
/// Each field is written at most once; the setters report whether the value
/// was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentLinkage {
    pro: Option<bool>,
    target: Option<ArgumentTarget>,
    claim_id: Option<String>,
}

impl ArgumentLinkage {
    pub fn is_empty(&self) -> bool {
        self.pro.is_none() && self.target.is_none() && self.claim_id.is_none()
    }

    pub fn target(&self) -> Option<&ArgumentTarget> {
        self.target.as_ref()
    }

    pub fn claim_id(&self) -> Option<&str> {
        self.claim_id.as_deref()
    }

    /// Sets target and polarity together. Returns `false` if already targeted.
    pub fn set_target(&mut self, target: ArgumentTarget, pro: bool) -> bool {
        if self.target.is_some() {
            return false;
        }
        self.target = Some(target);
        self.pro = Some(pro);
        true
    }

    /// Returns `false` if a base claim was already recorded.
    pub fn set_claim(&mut self, claim_id: impl Into<String>) -> bool {
        if self.claim_id.is_some() {
            return false;
        }
        self.claim_id = Some(claim_id.into());
        true
    }

    pub fn apply_to(&self, argument: &mut Argument) {
        if let Some(pro) = self.pro {
            argument.pro = pro;
        }
        match &self.target {
            Some(ArgumentTarget::Claim(id)) => {
                argument.target_claim_id = Some(id.clone());
                argument.target_argument_id = None;
            }
            Some(ArgumentTarget::Argument(id)) => {
                argument.target_argument_id = Some(id.clone());
                argument.target_claim_id = None;
            }
            None => {}
        }
        if let Some(claim_id) = &self.claim_id {
            argument.claim_id = Some(claim_id.clone());
        }
    }

    /// Partial document carrying only the fields this linkage sets.
    pub fn to_patch(&self) -> Value {
        let mut patch = Map::new();
        if let Some(pro) = self.pro {
            patch.insert("pro".to_string(), Value::Bool(pro));
        }
        match &self.target {
            Some(ArgumentTarget::Claim(id)) => {
                patch.insert("targetClaimId".to_string(), Value::String(id.clone()));
            }
            Some(ArgumentTarget::Argument(id)) => {
                patch.insert("targetArgId".to_string(), Value::String(id.clone()));
            }
            None => {}
        }
        if let Some(claim_id) = &self.claim_id {
            patch.insert("claimId".to_string(), Value::String(claim_id.clone()));
        }
        Value::Object(patch)
    }
}
