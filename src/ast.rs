//! Abstract syntax tree for rule expressions

use serde::{Deserialize, Serialize};

/// AST node for rule expressions
///
/// The serialized form is the wire shape collaborators store and transmit
/// verbatim: `type` is the variant tag (`"operand"` for conditions,
/// `"operator"` for connectives), connectives carry `left`/`right` sub-trees
/// plus their operator under `value`, and conditions carry a
/// `{field, operator, value}` triple under `value`.
///
/// Trees are immutable after construction. Every connective owns exactly two
/// children; a single condition with no connective is itself a valid tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AstNode {
    /// Single comparison like `age > 30`
    #[serde(rename = "operand")]
    Condition { value: Condition },
    /// AND / OR over two sub-trees
    #[serde(rename = "operator")]
    Connective {
        value: LogicOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

impl AstNode {
    /// Build a condition leaf
    pub fn condition(
        field: impl Into<String>,
        operator: ComparisonOp,
        value: impl Into<String>,
    ) -> Self {
        AstNode::Condition {
            value: Condition {
                field: field.into(),
                operator,
                value: value.into(),
            },
        }
    }

    /// Build a connective over two sub-trees
    pub fn connective(op: LogicOp, left: AstNode, right: AstNode) -> Self {
        AstNode::Connective {
            value: op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Single comparison expression: field, operator, literal value
///
/// The literal stays a string; whether it is compared numerically or
/// textually is decided at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ComparisonOp,
    pub value: String,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    /// Greater than (>)
    #[serde(rename = ">")]
    Greater,
    /// Less than (<)
    #[serde(rename = "<")]
    Less,
    /// Equal (=)
    #[serde(rename = "=")]
    Equal,
}

impl ComparisonOp {
    /// Map an operator lexeme onto the closed operator set
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            ">" => Some(ComparisonOp::Greater),
            "<" => Some(ComparisonOp::Less),
            "=" => Some(ComparisonOp::Equal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Greater => ">",
            ComparisonOp::Less => "<",
            ComparisonOp::Equal => "=",
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl LogicOp {
    /// AND binds tighter than OR
    pub(crate) fn precedence(self) -> u8 {
        match self {
            LogicOp::And => 1,
            LogicOp::Or => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }
}
