//! Pass 2: typed edge construction and repair.
//!
//! Source children maps are untyped; the edge kind follows from what the
//! parent and the child resolved to in pass 1:
//!
//! | parent             | child    | result                                          |
//! |--------------------|----------|-------------------------------------------------|
//! | multi-premise claim| claim    | Premise (ordered by `childrenOrder`)            |
//! | claim              | argument | Inference, argument targets the claim           |
//! | claim              | claim    | synthetic argument + Inference + BaseClaim      |
//! | argument           | argument | Inference, child targets the parent argument    |
//! | argument           | claim    | BaseClaim, parent is based on the claim         |
//!
//! Argument linkage (`pro`, target, `claimId`) is collected while walking and
//! written with a single update per argument at the end.

use crate::build::Migration;
use crate::report::Notice;
use crate::MigrateError;
use cdmigrate_model::entity::{DEFAULT_RELEVANCE, DEFAULT_STRENGTH, DEFAULT_TRUTH};
use cdmigrate_model::{
    collections, Argument, ArgumentLinkage, ArgumentTarget, BaseClaim, ChildRef, Claim,
    Inference, Node, NodeType, Polarity, PremiseRule, Premise, Vertex,
};
use std::collections::{BTreeMap, BTreeSet};

/// Bookkeeping for one edge pass.
#[derive(Debug, Default)]
struct EdgePass {
    /// Polarity each node declares for itself, used when a child reference
    /// carries none.
    own_polarity: BTreeMap<String, Option<Polarity>>,
    linkage: BTreeMap<String, ArgumentLinkage>,
    /// Arguments that are the target of at least one Inference edge.
    inferred: BTreeSet<String>,
    /// Arguments with an outgoing BaseClaim edge.
    based: BTreeSet<String>,
}

impl EdgePass {
    fn pro(&self, child: &ChildRef) -> bool {
        child
            .polarity
            .or_else(|| self.own_polarity.get(&child.id).copied().flatten())
            .map(Polarity::is_pro)
            .unwrap_or(false)
    }
}

fn target_id(target: &ArgumentTarget) -> &str {
    match target {
        ArgumentTarget::Claim(id) | ArgumentTarget::Argument(id) => id,
    }
}

impl<'a> Migration<'a> {
    pub(crate) fn build_edges(&mut self, working: &[Node]) -> Result<(), MigrateError> {
        let mut pass = EdgePass {
            own_polarity: working
                .iter()
                .map(|n| (n.id.clone(), n.polarity))
                .collect(),
            ..EdgePass::default()
        };

        for node in working {
            tracing::debug!(id = %node.id, children = node.children.len(), "building edges");
            if node.children.is_empty() {
                self.report.record(Notice::NoChildren {
                    node: node.id.clone(),
                    node_type: node.node_type.to_string(),
                });
            }
            match node.node_type {
                NodeType::Claim if node.multi_premise => self.link_premises(node)?,
                NodeType::Claim => self.link_claim_children(node, &mut pass)?,
                NodeType::Argument => self.link_argument_children(node, &mut pass)?,
                other => {
                    return Err(MigrateError::NotRegistered {
                        id: node.id.clone(),
                        node_type: other,
                    })
                }
            }
        }

        self.repair_dangling_arguments(&mut pass)?;
        self.apply_linkage(pass)?;
        self.report_unlinked_arguments();
        Ok(())
    }

    fn claim(&self, id: &str) -> Result<Claim, MigrateError> {
        self.claims
            .get(id)
            .cloned()
            .ok_or_else(|| MigrateError::NotRegistered {
                id: id.to_string(),
                node_type: NodeType::Claim,
            })
    }

    fn argument(&self, id: &str) -> Result<Argument, MigrateError> {
        self.arguments
            .get(id)
            .cloned()
            .ok_or_else(|| MigrateError::NotRegistered {
                id: id.to_string(),
                node_type: NodeType::Argument,
            })
    }

    fn link_premises(&mut self, node: &Node) -> Result<(), MigrateError> {
        let parent = self.claim(&node.id)?;
        for child in node.ordered_children() {
            let premise =
                self.claims
                    .get(&child.id)
                    .cloned()
                    .ok_or_else(|| MigrateError::PremiseNotFound {
                        parent: node.id.clone(),
                        child: child.id.clone(),
                    })?;
            let order = node.child_order(&child.id);
            let edge = Premise::new(&parent, &premise, order, &mut *self.ids);
            self.persist(collections::PREMISES, &edge)?;
            self.report.premises += 1;
        }
        Ok(())
    }

    fn link_claim_children(&mut self, node: &Node, pass: &mut EdgePass) -> Result<(), MigrateError> {
        let parent = self.claim(&node.id)?;
        for child in node.ordered_children() {
            let pro = pass.pro(child);
            if let Some(argument) = self.arguments.get(&child.id).cloned() {
                let target = ArgumentTarget::Claim(parent.id.clone());
                self.link_inference(parent.handle(), target, &argument, pro, pass)?;
            } else if let Some(cited) = self.claims.get(&child.id).cloned() {
                self.insert_mediating_argument(&parent, &cited, pro, pass)?;
            } else {
                return Err(MigrateError::ChildNotFound {
                    parent: node.id.clone(),
                    child: child.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn link_argument_children(
        &mut self,
        node: &Node,
        pass: &mut EdgePass,
    ) -> Result<(), MigrateError> {
        let parent = self.argument(&node.id)?;
        let mut children = node.ordered_children();
        // A claim split off in pass 1 is this argument's base claim; it goes
        // first so any other claim child is the extra one.
        if let Some(own) = parent.claim_id.as_deref() {
            if let Some(pos) = children.iter().position(|c| c.id == own) {
                let child = children.remove(pos);
                children.insert(0, child);
            }
        }
        for child in children {
            if let Some(argument) = self.arguments.get(&child.id).cloned() {
                let pro = pass.pro(child);
                let target = ArgumentTarget::Argument(parent.id.clone());
                self.link_inference(parent.handle(), target, &argument, pro, pass)?;
            } else if let Some(claim) = self.claims.get(&child.id).cloned() {
                self.link_base_claim(&parent, &claim, pass)?;
            } else {
                return Err(MigrateError::ChildNotFound {
                    parent: node.id.clone(),
                    child: child.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn link_inference(
        &mut self,
        from: String,
        target: ArgumentTarget,
        argument: &Argument,
        pro: bool,
        pass: &mut EdgePass,
    ) -> Result<(), MigrateError> {
        let linkage = pass.linkage.entry(argument.id.clone()).or_default();
        let ignored = target_id(&target).to_string();
        if !linkage.set_target(target, pro) {
            let kept = linkage.target().map(target_id).unwrap_or_default().to_string();
            self.report.record(Notice::Relinked {
                argument: argument.id.clone(),
                kept,
                ignored,
            });
        }

        let edge = Inference::new(from, argument, &mut *self.ids);
        self.persist(collections::INFERENCES, &edge)?;
        self.report.inferences += 1;
        pass.inferred.insert(argument.id.clone());
        Ok(())
    }

    fn link_base_claim(
        &mut self,
        argument: &Argument,
        claim: &Claim,
        pass: &mut EdgePass,
    ) -> Result<(), MigrateError> {
        let linkage = pass.linkage.entry(argument.id.clone()).or_default();
        if !linkage.set_claim(claim.id.clone()) {
            let kept = linkage.claim_id().unwrap_or_default().to_string();
            self.report.record(Notice::ExtraBaseClaim {
                argument: argument.id.clone(),
                kept,
                ignored: claim.id.clone(),
            });
            return Ok(());
        }

        let edge = BaseClaim::new(argument, claim, &mut *self.ids);
        self.persist(collections::BASE_CLAIMS, &edge)?;
        self.report.base_claims += 1;
        pass.based.insert(argument.id.clone());
        Ok(())
    }

    /// A claim citing a claim: put an argument between them so the asserted
    /// relation and its polarity survive.
    fn insert_mediating_argument(
        &mut self,
        parent: &Claim,
        cited: &Claim,
        pro: bool,
        pass: &mut EdgePass,
    ) -> Result<(), MigrateError> {
        let argument = Argument {
            key: self.ids.fresh(),
            id: self.ids.fresh(),
            created_at: cited.created_at,
            creator: cited.creator.clone(),
            target_claim_id: Some(parent.id.clone()),
            target_argument_id: None,
            claim_id: Some(cited.id.clone()),
            title: String::new(),
            negation: String::new(),
            question: String::new(),
            note: String::new(),
            pro,
            relevance: DEFAULT_RELEVANCE,
            strength: DEFAULT_STRENGTH,
        };
        self.persist(collections::ARGUMENTS, &argument)?;
        self.report.arguments += 1;

        let inference = Inference::new(parent.handle(), &argument, &mut *self.ids);
        self.persist(collections::INFERENCES, &inference)?;
        self.report.inferences += 1;

        let base = BaseClaim::new(&argument, cited, &mut *self.ids);
        self.persist(collections::BASE_CLAIMS, &base)?;
        self.report.base_claims += 1;

        pass.inferred.insert(argument.id.clone());
        pass.based.insert(argument.id.clone());
        self.report.record(Notice::ClaimCitesClaim {
            parent: parent.id.clone(),
            child: cited.id.clone(),
            argument: argument.id.clone(),
        });
        self.arguments.insert(argument.id.clone(), argument);
        Ok(())
    }

    /// Every inferring argument needs a proposition. Ones the source left
    /// without a claim child get a claim built from their own titles.
    fn repair_dangling_arguments(&mut self, pass: &mut EdgePass) -> Result<(), MigrateError> {
        let dangling: Vec<String> = pass.inferred.difference(&pass.based).cloned().collect();
        for id in dangling {
            let argument = self.argument(&id)?;
            let claim = Claim {
                key: self.ids.fresh(),
                id: self.ids.fresh(),
                created_at: argument.created_at,
                creator: argument.creator.clone(),
                title: argument.title.clone(),
                negation: argument.negation.clone(),
                question: argument.question.clone(),
                note: argument.note.clone(),
                multi_premise: false,
                premise_rule: PremiseRule::None,
                truth: DEFAULT_TRUTH,
                children_order: Vec::new(),
            };
            self.persist(collections::CLAIMS, &claim)?;
            self.report.claims += 1;

            let edge = BaseClaim::new(&argument, &claim, &mut *self.ids);
            self.persist(collections::BASE_CLAIMS, &edge)?;
            self.report.base_claims += 1;

            pass.linkage.entry(id.clone()).or_default().set_claim(claim.id.clone());
            pass.based.insert(id.clone());
            self.report.record(Notice::DanglingArgumentRepaired {
                argument: id,
                claim: claim.id.clone(),
            });
            self.claims.insert(claim.id.clone(), claim);
        }
        Ok(())
    }

    fn apply_linkage(&mut self, pass: EdgePass) -> Result<(), MigrateError> {
        for (id, linkage) in pass.linkage {
            if linkage.is_empty() {
                continue;
            }
            let argument = self
                .arguments
                .get_mut(&id)
                .ok_or_else(|| MigrateError::NotRegistered {
                    id: id.clone(),
                    node_type: NodeType::Argument,
                })?;
            linkage.apply_to(argument);
            let meta =
                self.store
                    .update_document(collections::ARGUMENTS, &argument.key, &linkage.to_patch())?;
            tracing::debug!(id = %meta.id, "updated item");
            self.report.argument_updates += 1;
        }
        Ok(())
    }

    fn report_unlinked_arguments(&mut self) {
        let unlinked: Vec<String> = self
            .arguments
            .values()
            .filter(|a| !a.is_linked())
            .map(|a| a.id.clone())
            .collect();
        for argument in unlinked {
            self.report.record(Notice::UnlinkedArgument { argument });
        }
    }
}
