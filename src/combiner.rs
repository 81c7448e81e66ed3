//! Combine several rules into one tree

use crate::ast::{AstNode, LogicOp};
use crate::error::{Result, RuleError};
use crate::parser;

/// Combine independently authored rules into a single tree.
///
/// The top-level connective is inferred by majority vote: each constituent
/// tree whose root is a connective votes for its root's operator; condition
/// roots do not vote, nested connectives are not counted, and ties go to
/// AND. The trees are then folded left to right in input order. The vote is
/// a deliberate heuristic for stitching together rules whose authors never
/// declared how they relate.
pub fn combine<S: AsRef<str>>(rules: &[S]) -> Result<AstNode> {
    let mut trees = Vec::with_capacity(rules.len());
    for (i, rule) in rules.iter().enumerate() {
        let tree = parser::parse(rule.as_ref())
            .map_err(|e| RuleError::Combine(format!("rule #{}: {}", i, e)))?;
        trees.push(tree);
    }

    let mut and_count = 0usize;
    let mut or_count = 0usize;
    for tree in &trees {
        if let AstNode::Connective { value, .. } = tree {
            match value {
                LogicOp::And => and_count += 1,
                LogicOp::Or => or_count += 1,
            }
        }
    }
    let main_op = if and_count >= or_count {
        LogicOp::And
    } else {
        LogicOp::Or
    };

    let mut iter = trees.into_iter();
    let mut root = match iter.next() {
        Some(tree) => tree,
        None => return Err(RuleError::Combine("empty rule list".to_string())),
    };
    for tree in iter {
        root = AstNode::connective(main_op, root, tree);
    }
    Ok(root)
}
