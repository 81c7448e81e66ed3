//! Error types for the rule engine core

use thiserror::Error;

/// Main error type for the rule engine core
///
/// One variant per pipeline stage, so callers can branch on where a rule
/// went wrong rather than inspecting message text. The payload carries the
/// cause message from the failing stage.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The raw rule string contains characters outside the allow-list
    #[error("Invalid rule string: {0}")]
    Validation(String),

    /// No tokens could be extracted from a non-empty rule string
    #[error("Failed to tokenize rule string: {0}")]
    Tokenize(String),

    /// Malformed token stream: unbalanced parentheses, dangling connective,
    /// or an unsplittable condition token
    #[error("Failed to parse rule string: {0}")]
    Parse(String),

    /// A constituent rule failed to parse, or there were no rules to combine
    #[error("Failed to combine rules: {0}")]
    Combine(String),

    /// Inconsistent tree state detected while evaluating
    #[error("Failed to evaluate rule: {0}")]
    Evaluation(String),
}

/// Result type alias for the rule engine core
pub type Result<T> = std::result::Result<T, RuleError>;
