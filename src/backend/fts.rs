//! FtsDetector (spec.md §4.4): recursively detect keyword-only leaves.
//!
//! Kept as a safety net for structurally degenerate trees; Black Diamond's
//! own AND/OR handling (§4.3) is the policy that actually matters for
//! well-formed rules (spec.md §9 OPEN QUESTION — FTS in AND/OR).

use crate::model::ConditionNode;

/// True iff `node`'s subtree contains a bare-scalar (keyword-only) leaf.
pub fn recursive_fts_search(node: &ConditionNode) -> bool {
    match node {
        ConditionNode::Keyword(_) => true,
        ConditionNode::MapItem { .. } => false,
        ConditionNode::And(children) | ConditionNode::Or(children) => {
            children.iter().any(recursive_fts_search)
        }
        ConditionNode::Not(child) | ConditionNode::Subexpression(child) => {
            recursive_fts_search(child)
        }
    }
}
