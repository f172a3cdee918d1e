//! The three typed edges of the canonical model.

use crate::entity::{Argument, Claim, Vertex};
use crate::ids::IdAllocator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claim or Argument → the Argument that infers something about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "start")]
    pub created_at: DateTime<Utc>,
    pub creator: String,
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
}

impl Inference {
    pub fn new(from: impl Into<String>, to: &Argument, ids: &mut dyn IdAllocator) -> Self {
        Self {
            key: ids.fresh(),
            created_at: to.created_at,
            creator: to.creator.clone(),
            from: from.into(),
            to: to.handle(),
        }
    }
}

/// Argument → the Claim that is the proposition it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseClaim {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "start")]
    pub created_at: DateTime<Utc>,
    pub creator: String,
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
}

impl BaseClaim {
    pub fn new(from: &Argument, to: &Claim, ids: &mut dyn IdAllocator) -> Self {
        Self {
            key: ids.fresh(),
            created_at: from.created_at,
            creator: from.creator.clone(),
            from: from.handle(),
            to: to.handle(),
        }
    }
}

/// Multi-premise Claim → one of its premise Claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "start")]
    pub created_at: DateTime<Utc>,
    pub creator: String,
    #[serde(rename = "_from")]
    pub from: String,
    #[serde(rename = "_to")]
    pub to: String,
    /// 1-indexed display position; 0 when the owner's order does not list it.
    pub order: u32,
}

impl Premise {
    pub fn new(from: &Claim, to: &Claim, order: u32, ids: &mut dyn IdAllocator) -> Self {
        Self {
            key: ids.fresh(),
            created_at: to.created_at,
            creator: to.creator.clone(),
            from: from.handle(),
            to: to.handle(),
            order,
        }
    }
}
