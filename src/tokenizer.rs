//! Rule string tokenizer and input validation

use crate::error::{Result, RuleError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Allow-list for raw rule strings: parentheses, whitespace, the AND/OR
/// keywords, comparison characters, quoted strings, digits, and the field
/// names the system recognizes.
static VALID_RULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\(|\)|\s|AND|OR|>|<|=|'[^']*'|\d+|age|department|salary|experience)+$")
        .expect("allow-list pattern is valid")
});

/// Lexer pattern: a parenthesis, a quoted literal, a run of word characters,
/// or a run of comparison characters, matched left to right.
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(|\)|'[^']*'|\w+|[><=]+").expect("token pattern is valid"));

/// Lexical token classes produced from a rule string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A complete comparison unit like `age>30`, quotes still attached
    Condition(String),
    And,
    Or,
    OpenParen,
    CloseParen,
}

/// Reject rule strings containing characters outside the allow-list.
///
/// Defense in depth, not a grammar check: `age age >` passes here and is
/// rejected later by the tree builder.
pub fn validate(rule: &str) -> Result<()> {
    if !VALID_RULE_RE.is_match(rule) {
        return Err(RuleError::Validation(format!(
            "disallowed characters in rule: {:?}",
            rule
        )));
    }
    Ok(())
}

/// Split a rule string into tokens.
///
/// Raw lexemes are matched left to right. Adjacent non-keyword lexemes
/// (identifier, comparison run, literal) are folded into a single
/// [`Token::Condition`], so `age > 30` and `age>30` tokenize identically.
pub fn tokenize(rule: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for lexeme in TOKEN_RE.find_iter(rule).map(|m| m.as_str()) {
        match lexeme {
            "(" => {
                flush_condition(&mut current, &mut tokens);
                tokens.push(Token::OpenParen);
            }
            ")" => {
                flush_condition(&mut current, &mut tokens);
                tokens.push(Token::CloseParen);
            }
            "AND" => {
                flush_condition(&mut current, &mut tokens);
                tokens.push(Token::And);
            }
            "OR" => {
                flush_condition(&mut current, &mut tokens);
                tokens.push(Token::Or);
            }
            _ => current.push_str(lexeme),
        }
    }
    flush_condition(&mut current, &mut tokens);

    if tokens.is_empty() && !rule.trim().is_empty() {
        return Err(RuleError::Tokenize(format!(
            "no tokens found in: {:?}",
            rule
        )));
    }

    Ok(tokens)
}

fn flush_condition(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        tokens.push(Token::Condition(std::mem::take(current)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_rule() {
        assert!(validate("age > 30 AND department = 'Sales'").is_ok());
        assert!(validate("(salary > 50000 OR experience > 5)").is_ok());
    }

    #[test]
    fn test_validate_rejects_disallowed_characters() {
        assert!(matches!(
            validate("age > 30; DROP TABLE rules"),
            Err(RuleError::Validation(_))
        ));
        assert!(matches!(validate("name = 'Bob'"), Err(RuleError::Validation(_))));
        assert!(matches!(validate(""), Err(RuleError::Validation(_))));
    }

    #[test]
    fn test_validate_is_not_a_grammar_check() {
        // Allow-listed but meaningless; the tree builder rejects it later
        assert!(validate("age age >").is_ok());
    }

    #[test]
    fn test_tokenize_spaced_and_compact_agree() {
        let spaced = tokenize("age > 30").unwrap();
        let compact = tokenize("age>30").unwrap();
        assert_eq!(spaced, vec![Token::Condition("age>30".to_string())]);
        assert_eq!(spaced, compact);
    }

    #[test]
    fn test_tokenize_keywords_and_parens() {
        let tokens = tokenize("(age > 30 AND salary < 50000) OR experience = 5").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenParen,
                Token::Condition("age>30".to_string()),
                Token::And,
                Token::Condition("salary<50000".to_string()),
                Token::CloseParen,
                Token::Or,
                Token::Condition("experience=5".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keeps_quotes_on_literals() {
        let tokens = tokenize("department = 'Sales'").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Condition("department='Sales'".to_string())]
        );
    }

    #[test]
    fn test_tokenize_quoted_literal_with_space() {
        let tokens = tokenize("department = 'Field Ops'").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Condition("department='Field Ops'".to_string())]
        );
    }

    #[test]
    fn test_tokenize_whitespace_only_fails() {
        assert!(matches!(tokenize("   "), Err(RuleError::Tokenize(_))));
    }
}
