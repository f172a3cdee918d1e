//! Debate graph data model
//!
//! Two sides of the migration live here:
//!
//! - the **source** side: [`Node`], one record of a debate-map export, with its
//!   untyped parent/child maps already decoded into [`ChildRef`]s, and
//! - the **target** side: the canonical [`Claim`] / [`Argument`] vertices and
//!   the three typed edges ([`Inference`], [`BaseClaim`], [`Premise`]).
//!
//! The factories (`new_claim`, `new_argument`, the edge constructors) are pure
//! apart from the identifiers they draw from an [`IdAllocator`].

pub mod edge;
pub mod entity;
pub mod ids;
pub mod node;

pub use edge::{BaseClaim, Inference, Premise};
pub use entity::{
    new_argument, new_claim, Argument, ArgumentLinkage, ArgumentTarget, Claim, PremiseRule, Vertex,
};
pub use ids::{IdAllocator, SequentialAllocator, UuidAllocator};
pub use node::{ArgumentType, ChildRef, Node, NodeType, Polarity, SourceGraph, TitleSet};

/// Store collection names written by a migration run.
pub mod collections {
    pub const CLAIMS: &str = "claims";
    pub const ARGUMENTS: &str = "arguments";
    pub const INFERENCES: &str = "inferences";
    pub const BASE_CLAIMS: &str = "base_claims";
    pub const PREMISES: &str = "premises";

    pub const VERTICES: [&str; 2] = [CLAIMS, ARGUMENTS];
    pub const EDGES: [&str; 3] = [INFERENCES, BASE_CLAIMS, PREMISES];
}
