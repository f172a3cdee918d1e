//! Run report: what was written, and every data-quality notice raised.

use serde::Serialize;
use std::fmt;

/// A non-fatal observation about the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// A claim or argument with an empty children map.
    NoChildren { node: String, node_type: String },
    /// A multi-premise argument whose split produced a claim with no premises.
    EmptyMultiPremise { argument: String, claim: String },
    /// A claim listed another claim as a child; `argument` was synthesized
    /// between them.
    ClaimCitesClaim {
        parent: String,
        child: String,
        argument: String,
    },
    /// An argument listed under a second parent; the first linkage was kept.
    Relinked {
        argument: String,
        kept: String,
        ignored: String,
    },
    /// An argument with a second claim child; no second base claim was written.
    ExtraBaseClaim {
        argument: String,
        kept: String,
        ignored: String,
    },
    /// An inferring argument had no proposition; `claim` was synthesized.
    DanglingArgumentRepaired { argument: String, claim: String },
    /// An argument no parent links to.
    UnlinkedArgument { argument: String },
}

impl Notice {
    pub fn is_repair(&self) -> bool {
        matches!(
            self,
            Self::ClaimCitesClaim { .. } | Self::DanglingArgumentRepaired { .. }
        )
    }

    /// Informational notices are expected on healthy data (leaf nodes).
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::NoChildren { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChildren { node, node_type } => write!(f, "{node_type} {node} has no children"),
            Self::EmptyMultiPremise { argument, claim } => write!(
                f,
                "multi-premise argument {argument} has no premises; claim {claim} is empty"
            ),
            Self::ClaimCitesClaim {
                parent,
                child,
                argument,
            } => write!(
                f,
                "claim {parent} cites claim {child} directly; inserted argument {argument}"
            ),
            Self::Relinked {
                argument,
                kept,
                ignored,
            } => write!(
                f,
                "argument {argument} is also listed under {ignored}; kept target {kept}"
            ),
            Self::ExtraBaseClaim {
                argument,
                kept,
                ignored,
            } => write!(
                f,
                "argument {argument} has a second claim child {ignored}; kept base claim {kept}"
            ),
            Self::DanglingArgumentRepaired { argument, claim } => write!(
                f,
                "argument {argument} had no base claim; synthesized claim {claim}"
            ),
            Self::UnlinkedArgument { argument } => {
                write!(f, "argument {argument} is not linked to any target")
            }
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub claims: usize,
    pub arguments: usize,
    pub inferences: usize,
    pub base_claims: usize,
    pub premises: usize,
    pub argument_updates: usize,
    pub notices: Vec<Notice>,
}

impl MigrationReport {
    pub fn vertices(&self) -> usize {
        self.claims + self.arguments
    }

    pub fn edges(&self) -> usize {
        self.inferences + self.base_claims + self.premises
    }

    pub fn repairs(&self) -> usize {
        self.notices.iter().filter(|n| n.is_repair()).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| !n.is_informational())
    }

    pub(crate) fn record(&mut self, notice: Notice) {
        if notice.is_informational() {
            tracing::info!(notice = %notice, "data notice");
        } else {
            tracing::warn!(notice = %notice, "data inconsistency");
        }
        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_serialize_tagged() {
        let notice = Notice::ClaimCitesClaim {
            parent: "A".into(),
            child: "X".into(),
            argument: "S".into(),
        };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "claim_cites_claim");
        assert_eq!(json["argument"], "S");
        assert_eq!(
            notice.to_string(),
            "claim A cites claim X directly; inserted argument S"
        );
    }

    #[test]
    fn repairs_and_warnings_are_counted() {
        let mut report = MigrationReport::default();
        report.record(Notice::NoChildren {
            node: "n".into(),
            node_type: "claim".into(),
        });
        report.record(Notice::DanglingArgumentRepaired {
            argument: "a".into(),
            claim: "c".into(),
        });
        report.record(Notice::UnlinkedArgument { argument: "b".into() });
        assert_eq!(report.repairs(), 1);
        assert_eq!(report.warnings().count(), 2);
    }
}
