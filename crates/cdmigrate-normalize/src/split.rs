//! Node splitting.
//!
//! The source model conflates concepts the canonical model keeps apart:
//!
//! - a **multi-premise argument** is both an argument and the conjunction of
//!   its premises; canonically the conjunction is a multi-premise *Claim*;
//! - a **placeholder** (category/package/question) is neither a claim nor an
//!   argument but has to survive the migration for later curation.
//!
//! Both splits are pure: the only side effect is drawing fresh ids.

use crate::MigrateError;
use cdmigrate_model::{ChildRef, IdAllocator, Node, NodeType};
use std::collections::BTreeSet;

/// Result of splitting a multi-premise argument.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiPremiseSplit {
    /// Keeps the original id, parents and polarity, plus the polarized
    /// children (counter-arguments) and the new claim.
    pub argument: Node,
    /// Fresh id; owns the unpolarized children (the premises).
    pub claim: Node,
}

/// Result of splitting a placeholder node.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSplit {
    pub claim: Node,
    /// Present only when the placeholder had a parent.
    pub argument: Option<Node>,
}

/// Turn a multi-premise argument into an (argument, multi-premise claim) pair.
pub fn split_multi_premise(
    node: Node,
    ids: &mut dyn IdAllocator,
) -> Result<MultiPremiseSplit, MigrateError> {
    if !node.is_multi_premise_argument() {
        return Err(MigrateError::NotSplittable {
            id: node.id,
            reason: "not a multi-premise argument",
        });
    }

    let claim_id = ids.fresh();
    let Node {
        id,
        node_type: _,
        created_at,
        creator,
        titles,
        argument_type,
        note,
        polarity,
        multi_premise: _,
        parents,
        children,
        children_order,
    } = node;

    let mut claim = Node::new(claim_id.clone(), NodeType::Claim);
    claim.created_at = created_at;
    claim.creator = creator.clone();
    claim.titles = titles.clone();
    claim.argument_type = argument_type;
    claim.note = note.clone();
    claim.multi_premise = true;
    claim.children_order = children_order;
    claim.parents = BTreeSet::from([id.clone()]);

    let mut argument = Node::new(id, NodeType::Argument);
    argument.created_at = created_at;
    argument.creator = creator;
    argument.titles = titles;
    argument.note = note;
    argument.polarity = polarity;
    argument.parents = parents;

    for (child_id, child) in children {
        if child.polarity.is_some() {
            argument.children.insert(child_id, child);
        } else {
            claim.children.insert(child_id, child);
        }
    }
    argument.add_child(ChildRef::unpolarized(claim_id));

    Ok(MultiPremiseSplit { argument, claim })
}

/// Turn a category/package/question into a claim, plus an argument when the
/// placeholder hangs under a parent.
///
/// With a parent, the argument takes over the placeholder's id so the parent's
/// children map still resolves to it; the claim gets a fresh id and the
/// placeholder's children. Without one, the claim simply replaces the node.
pub fn split_placeholder(
    node: Node,
    map_name: Option<&str>,
    ids: &mut dyn IdAllocator,
) -> Result<PlaceholderSplit, MigrateError> {
    if !node.is_placeholder() {
        return Err(MigrateError::NotSplittable {
            id: node.id,
            reason: "not a category, package or question",
        });
    }

    let mut claim_titles = node.titles.clone();
    if let Some(name) = map_name {
        claim_titles.base = name.to_string();
    }

    if !node.has_parent() {
        let mut claim = node;
        claim.node_type = NodeType::Claim;
        claim.titles = claim_titles;
        claim.multi_premise = false;
        return Ok(PlaceholderSplit {
            claim,
            argument: None,
        });
    }

    let claim_id = ids.fresh();
    let Node {
        id,
        node_type: _,
        created_at,
        creator,
        titles: _,
        argument_type,
        note,
        polarity,
        multi_premise: _,
        parents,
        children,
        children_order,
    } = node;

    let mut claim = Node::new(claim_id.clone(), NodeType::Claim);
    claim.created_at = created_at;
    claim.creator = creator.clone();
    claim.titles = claim_titles.clone();
    claim.argument_type = argument_type;
    claim.note = note.clone();
    claim.children = children;
    claim.children_order = children_order;
    claim.parents = BTreeSet::from([id.clone()]);

    let mut argument = Node::new(id, NodeType::Argument);
    argument.created_at = created_at;
    argument.creator = creator;
    argument.titles = claim_titles;
    argument.note = note;
    argument.polarity = polarity;
    argument.parents = parents;
    argument.add_child(ChildRef::unpolarized(claim_id));

    Ok(PlaceholderSplit {
        claim,
        argument: Some(argument),
    })
}
