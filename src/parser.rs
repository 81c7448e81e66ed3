//! Rule tree builder (operator-precedence parser)
//!
//! Classic shunting-yard over the token stream: a pending-operand stack of
//! sub-trees and a pending-operator stack of connectives/parentheses.

use crate::ast::{AstNode, ComparisonOp, LogicOp};
use crate::error::{Result, RuleError};
use crate::tokenizer::{self, Token};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Maximum parenthesis nesting depth accepted by the builder
const MAX_NESTING_DEPTH: usize = 64;

/// Splitter for a condition token: field, comparison run, literal.
/// The whole token must match; trailing garbage is a parse error.
static CONDITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)([><=]+)('[^']*'|\w+)$").expect("condition pattern is valid"));

/// Entries on the pending-operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum StackOp {
    Paren,
    Logic(LogicOp),
}

type OperandStack = SmallVec<[AstNode; 8]>;

/// Parse a rule string into an AST: validate, tokenize, build
pub fn parse(rule: &str) -> Result<AstNode> {
    tokenizer::validate(rule)?;
    let tokens = tokenizer::tokenize(rule)?;
    build(&tokens)
}

/// Build an AST from a token sequence.
///
/// AND (precedence 1) binds tighter than OR (precedence 0); parentheses
/// override. A single condition token yields a one-node tree.
pub fn build(tokens: &[Token]) -> Result<AstNode> {
    if tokens.is_empty() {
        return Err(RuleError::Parse("empty token list".to_string()));
    }

    let mut operands: OperandStack = SmallVec::new();
    let mut operators: SmallVec<[StackOp; 8]> = SmallVec::new();
    let mut depth = 0usize;

    for token in tokens {
        match token {
            Token::OpenParen => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(RuleError::Parse(format!(
                        "nesting deeper than {} levels",
                        MAX_NESTING_DEPTH
                    )));
                }
                operators.push(StackOp::Paren);
            }
            Token::CloseParen => {
                loop {
                    match operators.pop() {
                        Some(StackOp::Logic(op)) => apply(op, &mut operands)?,
                        Some(StackOp::Paren) => break,
                        None => {
                            return Err(RuleError::Parse(
                                "unbalanced parentheses: unmatched ')'".to_string(),
                            ))
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Token::And | Token::Or => {
                let incoming = match token {
                    Token::And => LogicOp::And,
                    _ => LogicOp::Or,
                };
                // Reduce while the stack top is a connective of equal or
                // higher precedence; an open parenthesis stops the scan.
                while let Some(StackOp::Logic(top)) = operators.last().copied() {
                    if top.precedence() >= incoming.precedence() {
                        operators.pop();
                        apply(top, &mut operands)?;
                    } else {
                        break;
                    }
                }
                operators.push(StackOp::Logic(incoming));
            }
            Token::Condition(raw) => operands.push(parse_condition(raw)?),
        }
    }

    while let Some(entry) = operators.pop() {
        match entry {
            StackOp::Logic(op) => apply(op, &mut operands)?,
            StackOp::Paren => {
                return Err(RuleError::Parse(
                    "unbalanced parentheses: unmatched '('".to_string(),
                ))
            }
        }
    }

    let root = match operands.pop() {
        Some(node) => node,
        None => return Err(RuleError::Parse("no expression produced".to_string())),
    };
    if !operands.is_empty() {
        return Err(RuleError::Parse(format!(
            "{} operand(s) left without a connective",
            operands.len()
        )));
    }
    Ok(root)
}

/// Pop two operands and push the connective built from them.
/// The stack top becomes the right child, the next entry the left.
fn apply(op: LogicOp, operands: &mut OperandStack) -> Result<()> {
    let right = pop_operand(op, operands)?;
    let left = pop_operand(op, operands)?;
    operands.push(AstNode::connective(op, left, right));
    Ok(())
}

fn pop_operand(op: LogicOp, operands: &mut OperandStack) -> Result<AstNode> {
    operands
        .pop()
        .ok_or_else(|| RuleError::Parse(format!("missing operand for {}", op.as_str())))
}

/// Split a condition token into field, operator and literal value.
///
/// Quotes around the literal are stripped here. Operator runs outside the
/// closed set (`>>`, `>=`, a missing operator) are parse errors.
fn parse_condition(raw: &str) -> Result<AstNode> {
    let caps = CONDITION_RE
        .captures(raw)
        .ok_or_else(|| RuleError::Parse(format!("cannot split condition token: {:?}", raw)))?;

    let operator = ComparisonOp::from_lexeme(&caps[2])
        .ok_or_else(|| RuleError::Parse(format!("unknown comparison operator: {:?}", &caps[2])))?;
    let value = caps[3].trim_matches('\'').to_string();

    Ok(AstNode::condition(&caps[1], operator, value))
}
