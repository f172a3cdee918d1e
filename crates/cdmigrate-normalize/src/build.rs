//! Run orchestration and pass 1 (vertex materialization).
//!
//! ```text
//!   source nodes ──pass 1──► Claim / Argument vertices   (+ split-off claims)
//!   working list ──pass 2──► Inference / BaseClaim / Premise edges
//!                            + one linkage update per Argument
//! ```
//!
//! Every vertex is written before any edge, so pass 2 can treat an id missing
//! from both vertex maps as a referential violation in the source data.

use crate::report::{MigrationReport, Notice};
use crate::split::{split_multi_premise, split_placeholder};
use crate::MigrateError;
use cdmigrate_model::{
    collections, new_argument, new_claim, Argument, Claim, IdAllocator, Node, NodeType,
    SourceGraph,
};
use cdmigrate_storage::{CollectionKind, DocumentStore};
use serde::Serialize;
use std::collections::BTreeMap;

/// State owned by one migration run.
pub struct Migration<'a> {
    pub(crate) store: &'a mut dyn DocumentStore,
    pub(crate) ids: &'a mut dyn IdAllocator,
    pub(crate) map_names: BTreeMap<String, String>,
    pub(crate) claims: BTreeMap<String, Claim>,
    pub(crate) arguments: BTreeMap<String, Argument>,
    pub(crate) report: MigrationReport,
}

impl<'a> Migration<'a> {
    pub fn new(store: &'a mut dyn DocumentStore, ids: &'a mut dyn IdAllocator) -> Self {
        Self {
            store,
            ids,
            map_names: BTreeMap::new(),
            claims: BTreeMap::new(),
            arguments: BTreeMap::new(),
            report: MigrationReport::default(),
        }
    }

    /// Truncate the target collections, then run both passes.
    pub fn run(mut self, graph: SourceGraph) -> Result<MigrationReport, MigrateError> {
        tracing::info!(nodes = graph.nodes.len(), "starting data migration");
        self.map_names = graph.map_names;
        self.open_collections()?;

        let working = self.materialize_vertices(graph.nodes)?;
        tracing::info!(
            claims = self.report.claims,
            arguments = self.report.arguments,
            "vertices materialized"
        );

        self.build_edges(&working)?;
        tracing::info!(
            inferences = self.report.inferences,
            base_claims = self.report.base_claims,
            premises = self.report.premises,
            repairs = self.report.repairs(),
            "edges built"
        );
        Ok(self.report)
    }

    fn open_collections(&mut self) -> Result<(), MigrateError> {
        for name in collections::VERTICES {
            self.store
                .open_collection(name, CollectionKind::Document, true)?;
        }
        for name in collections::EDGES {
            self.store.open_collection(name, CollectionKind::Edge, true)?;
        }
        Ok(())
    }

    /// Pass 1. Returns the working list for pass 2: only Claim and Argument
    /// nodes, with split nodes replaced by their rewritten structure and the
    /// split-off claims appended.
    pub(crate) fn materialize_vertices(
        &mut self,
        nodes: Vec<Node>,
    ) -> Result<Vec<Node>, MigrateError> {
        let mut working: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut queued_claims: Vec<Node> = Vec::new();

        for node in nodes {
            tracing::debug!(id = %node.id, node_type = %node.node_type, "materializing node");
            match node.node_type {
                NodeType::Claim => {
                    self.register_claim(&node)?;
                    working.push(node);
                }
                NodeType::Argument if node.multi_premise => {
                    let split = split_multi_premise(node, &mut *self.ids)?;
                    if split.claim.children.is_empty() {
                        self.report.record(Notice::EmptyMultiPremise {
                            argument: split.argument.id.clone(),
                            claim: split.claim.id.clone(),
                        });
                    }
                    self.register_argument(&split.argument, Some(&split.claim.id))?;
                    working.push(split.argument);
                    queued_claims.push(split.claim);
                }
                NodeType::Argument => {
                    self.register_argument(&node, None)?;
                    working.push(node);
                }
                NodeType::Category | NodeType::Package | NodeType::Question => {
                    let map_name = self.map_names.get(&node.id).cloned();
                    let split = split_placeholder(node, map_name.as_deref(), &mut *self.ids)?;
                    match split.argument {
                        Some(argument) => {
                            self.register_argument(&argument, Some(&split.claim.id))?;
                            working.push(argument);
                            queued_claims.push(split.claim);
                        }
                        None => {
                            self.register_claim(&split.claim)?;
                            working.push(split.claim);
                        }
                    }
                }
            }
        }

        for claim_node in queued_claims {
            self.register_claim(&claim_node)?;
            working.push(claim_node);
        }
        Ok(working)
    }

    fn ensure_unregistered(&self, id: &str) -> Result<(), MigrateError> {
        if self.claims.contains_key(id) || self.arguments.contains_key(id) {
            return Err(MigrateError::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    fn register_claim(&mut self, node: &Node) -> Result<(), MigrateError> {
        self.ensure_unregistered(&node.id)?;
        let claim = new_claim(node, &mut *self.ids);
        self.persist(collections::CLAIMS, &claim)?;
        self.report.claims += 1;
        self.claims.insert(claim.id.clone(), claim);
        Ok(())
    }

    fn register_argument(&mut self, node: &Node, claim_id: Option<&str>) -> Result<(), MigrateError> {
        self.ensure_unregistered(&node.id)?;
        let mut argument = new_argument(node, &mut *self.ids);
        argument.claim_id = claim_id.map(str::to_string);
        self.persist(collections::ARGUMENTS, &argument)?;
        self.report.arguments += 1;
        self.arguments.insert(argument.id.clone(), argument);
        Ok(())
    }

    pub(crate) fn persist<T: Serialize>(
        &mut self,
        collection: &str,
        record: &T,
    ) -> Result<(), MigrateError> {
        let doc = serde_json::to_value(record).map_err(|source| MigrateError::Encode {
            collection: collection.to_string(),
            source,
        })?;
        let meta = self.store.create_document(collection, &doc)?;
        tracing::debug!(id = %meta.id, "created item");
        Ok(())
    }
}
