//! # Stage: Response Classifier
//!
//! ## Responsibility
//! Map a raw chat message to a canned answer when it is one of the common
//! tutoring questions (greeting, farewell, thanks, identity, a catalogued
//! topic, a small arithmetic expression), so the caller can skip the model.
//!
//! ## Guarantees
//! - Deterministic: the same message always produces the same answer
//! - First match wins: rules are tried in declaration order, then arithmetic
//! - Non-failing: the worst outcome is `None`, which means "ask the model"
//! - Immutable rules: the table is fixed once the classifier is built
//!
//! ## NOT Responsible For
//! - Semantic matching (the topic fallback is a word-overlap heuristic)
//! - Calling the model on a miss
//! - Timing (see [`crate::tracker`])

pub mod arithmetic;
pub mod builtin;
pub mod normalize;
pub mod rule;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::debug;

pub use arithmetic::{ArithmeticExpression, Operator};
pub use normalize::normalize;
pub use rule::{MatchKind, Matcher, PatternRule, RuleMatch, SIMILARITY_THRESHOLD};

static BUILTIN_RULES: Lazy<Vec<PatternRule>> =
    Lazy::new(|| builtin::rules().expect("built-in classifier patterns compile"));

/// A classifier answer plus how it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheHit {
    pub response: String,
    pub kind: MatchKind,
    /// Rule name, or `"arithmetic"` for evaluated expressions.
    pub rule: String,
}

/// Ordered rule table plus the arithmetic fallback.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<PatternRule>,
}

impl Default for Classifier {
    /// Classifier over the built-in Spanish rule tables.
    fn default() -> Self {
        Self::new(BUILTIN_RULES.clone())
    }
}

impl Classifier {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Canned answer for `message`, or `None` to fall through to the model.
    pub fn classify(&self, message: &str) -> Option<String> {
        self.classify_detailed(message).map(|hit| hit.response)
    }

    /// Like [`Classifier::classify`] but reports which rule matched.
    pub fn classify_detailed(&self, message: &str) -> Option<CacheHit> {
        let normalized = normalize(message);

        for rule in &self.rules {
            if let Some(m) = rule.try_match(&normalized) {
                debug!(message = %normalized, rule = m.rule, kind = %m.kind, "cache hit");
                return Some(CacheHit {
                    response: m.response.to_string(),
                    kind: m.kind,
                    rule: m.rule.to_string(),
                });
            }
        }

        if let Some(response) = arithmetic::answer(&normalized) {
            debug!(message = %normalized, kind = %MatchKind::Arithmetic, "cache hit");
            return Some(CacheHit {
                response,
                kind: MatchKind::Arithmetic,
                rule: "arithmetic".to_string(),
            });
        }

        debug!(message = %normalized, "cache miss");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_hit() {
        let c = Classifier::default();
        assert_eq!(c.classify("Hola").as_deref(), Some(builtin::GREETING));
    }

    #[test]
    fn test_prime_question_with_accents() {
        let c = Classifier::default();
        let hit = c.classify_detailed("¿Qué son los números primos?").unwrap();
        assert_eq!(hit.response, builtin::PRIMES);
        assert_eq!(hit.kind, MatchKind::Pattern);
        assert_eq!(hit.rule, "tema_primos");
    }

    #[test]
    fn test_topic_variation_behind_single_topic_patterns() {
        let c = Classifier::default();
        let hit = c.classify_detailed("Háblame sobre los primos").unwrap();
        assert_eq!(hit.response, builtin::PRIMES);
        assert_eq!(hit.kind, MatchKind::Topic);
        assert_eq!(hit.rule, "numeros_primos");
    }

    #[test]
    fn test_photosynthesis_via_variation() {
        let c = Classifier::default();
        let hit = c.classify_detailed("¿Qué es la fotosíntesis?").unwrap();
        assert_eq!(hit.response, builtin::PHOTOSYNTHESIS);
        assert_eq!(hit.kind, MatchKind::Topic);
    }

    #[test]
    fn test_arithmetic_hit_reports_kind() {
        let c = Classifier::default();
        let hit = c.classify_detailed("25*4").unwrap();
        assert_eq!(hit.response, "25 × 4 = 100");
        assert_eq!(hit.kind, MatchKind::Arithmetic);
    }

    #[test]
    fn test_division_by_zero_misses() {
        assert_eq!(Classifier::default().classify("7/0"), None);
    }

    #[test]
    fn test_unrelated_message_misses() {
        assert_eq!(Classifier::default().classify("Escribe un poema sobre el mar"), None);
    }

    #[test]
    fn test_first_rule_wins_over_later_rules() {
        let rules = vec![
            PatternRule::exact("first", ["hola"], "uno"),
            PatternRule::exact("second", ["hola"], "dos"),
        ];
        let c = Classifier::new(rules);
        assert_eq!(c.classify("hola").as_deref(), Some("uno"));
    }

    #[test]
    fn test_rules_precede_arithmetic() {
        let rules = vec![PatternRule::regex_set("nums", &[r"^\d+\+\d+$"], "custom").unwrap()];
        let c = Classifier::new(rules);
        assert_eq!(c.classify("2+2").as_deref(), Some("custom"));
    }

    #[test]
    fn test_empty_rule_table_still_does_arithmetic() {
        let c = Classifier::new(Vec::new());
        assert_eq!(c.classify("2+2").as_deref(), Some("2 + 2 = 4"));
        assert_eq!(c.classify("hola"), None);
    }
}
