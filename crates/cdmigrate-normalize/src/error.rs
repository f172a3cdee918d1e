use cdmigrate_model::NodeType;
use cdmigrate_storage::StoreError;

/// Fatal conditions of a migration run. Any of these aborts the run; the
/// store is left partially written and the recovery is a fresh run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("child {child} of {parent} not found")]
    ChildNotFound { parent: String, child: String },

    #[error("premise {child} of multi-premise claim {parent} is not a claim")]
    PremiseNotFound { parent: String, child: String },

    #[error("{node_type} node {id} was not registered as a vertex")]
    NotRegistered { id: String, node_type: NodeType },

    #[error("node id {id} appears more than once")]
    DuplicateId { id: String },

    #[error("cannot split {id}: {reason}")]
    NotSplittable { id: String, reason: &'static str },

    #[error("failed to encode {collection} record: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
