//! Rule evaluation against a record

use crate::ast::{AstNode, ComparisonOp, Condition, LogicOp};
use crate::error::{Result, RuleError};
use crate::record::Record;

/// Pending work for the post-order walk
enum Frame<'a> {
    Visit(&'a AstNode),
    Combine(LogicOp),
}

/// Evaluate an AST against a record.
///
/// The walk is iterative with an explicit frame stack, so tree depth never
/// becomes call-stack depth. Both children of a connective are evaluated;
/// neither side has side effects, so short-circuiting is not observable.
pub fn evaluate(node: &AstNode, record: &Record) -> Result<bool> {
    let mut frames = vec![Frame::Visit(node)];
    let mut results: Vec<bool> = Vec::new();

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Visit(AstNode::Condition { value }) => {
                results.push(check_condition(value, record));
            }
            Frame::Visit(AstNode::Connective { value, left, right }) => {
                frames.push(Frame::Combine(*value));
                frames.push(Frame::Visit(right));
                frames.push(Frame::Visit(left));
            }
            Frame::Combine(op) => {
                let right = pop_result(&mut results)?;
                let left = pop_result(&mut results)?;
                results.push(match op {
                    LogicOp::And => left && right,
                    LogicOp::Or => left || right,
                });
            }
        }
    }

    let result = pop_result(&mut results)?;
    if !results.is_empty() {
        return Err(RuleError::Evaluation(
            "leftover results after traversal".to_string(),
        ));
    }
    Ok(result)
}

fn pop_result(results: &mut Vec<bool>) -> Result<bool> {
    results
        .pop()
        .ok_or_else(|| RuleError::Evaluation("result stack underflow".to_string()))
}

/// Compare one condition against the record.
///
/// Coercion policy: when both the record value and the literal parse as
/// numbers the comparison is numeric; otherwise it falls back to strings
/// (`=` exact equality, `>`/`<` lexicographic order). A field absent from
/// the record fails every comparison.
fn check_condition(cond: &Condition, record: &Record) -> bool {
    let field_value = match record.get(&cond.field) {
        Some(value) => value,
        None => return false,
    };

    match (field_value.as_number(), cond.value.trim().parse::<f64>()) {
        (Some(lhs), Ok(rhs)) => match cond.operator {
            ComparisonOp::Greater => lhs > rhs,
            ComparisonOp::Less => lhs < rhs,
            ComparisonOp::Equal => lhs == rhs,
        },
        _ => {
            let lhs = field_value.as_text();
            let rhs = cond.value.as_str();
            match cond.operator {
                ComparisonOp::Greater => lhs.as_ref() > rhs,
                ComparisonOp::Less => lhs.as_ref() < rhs,
                ComparisonOp::Equal => lhs.as_ref() == rhs,
            }
        }
    }
}
