//! Rule parsing cache
//!
//! A stored rule is evaluated against many records, so parsed trees are
//! memoized by their source text instead of re-parsed per request.

use crate::ast::AstNode;
use crate::error::Result;
use crate::evaluator;
use crate::parser;
use crate::record::Record;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Process-wide rule cache keyed by rule text, with fast hashing (ahash)
static RULE_CACHE: Lazy<RwLock<AHashMap<String, AstNode>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(256)));

/// Get the parsed tree for a rule string, parsing and caching on first use.
///
/// Trees are cloned out of the cache; the lock only guards the map, never an
/// evaluation.
#[inline]
pub fn get_or_parse(rule: &str) -> Result<AstNode> {
    // Fast path: read lock only
    {
        let cache = RULE_CACHE.read();
        if let Some(tree) = cache.get(rule) {
            return Ok(tree.clone());
        }
    }

    // Slow path: parse and cache
    let tree = parser::parse(rule)?;
    RULE_CACHE.write().insert(rule.to_string(), tree.clone());
    Ok(tree)
}

/// Evaluate a rule string against a record, using the cached tree.
///
/// An empty rule places no constraint on the record and passes.
#[inline]
pub fn check_rule(rule: &str, record: &Record) -> Result<bool> {
    if rule.trim().is_empty() {
        return Ok(true);
    }

    let tree = get_or_parse(rule)?;
    evaluator::evaluate(&tree, record)
}

/// Drop all cached trees (useful for testing)
pub fn clear_cache() {
    RULE_CACHE.write().clear();
}

/// Number of distinct rules currently cached
pub fn cache_size() -> usize {
    RULE_CACHE.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_cached_tree_matches_direct_parse() {
        let rule = "age > 30 AND department = 'Sales'";
        let direct = parse(rule).unwrap();
        let cached_first = get_or_parse(rule).unwrap();
        let cached_second = get_or_parse(rule).unwrap();
        assert_eq!(cached_first, direct);
        assert_eq!(cached_second, direct);
        assert!(cache_size() >= 1);
    }

    #[test]
    fn test_check_rule_matches_direct_evaluation() {
        let mut record = Record::new();
        record.insert("age", 35);
        record.insert("department", "Sales");

        let rule = "age > 30 AND department = 'Sales'";
        let direct = evaluator::evaluate(&parse(rule).unwrap(), &record).unwrap();
        assert_eq!(check_rule(rule, &record).unwrap(), direct);
        // repeated call hits the cache and agrees
        assert_eq!(check_rule(rule, &record).unwrap(), direct);
    }

    #[test]
    fn test_empty_rule_passes() {
        let record = Record::new();
        assert!(check_rule("", &record).unwrap());
        assert!(check_rule("   ", &record).unwrap());
    }

    #[test]
    fn test_parse_error_is_not_cached_as_success() {
        assert!(get_or_parse("age >> 30").is_err());
        assert!(get_or_parse("age >> 30").is_err());
    }
}
