//! Pattern rules: the tagged matcher variants and the word-overlap fallback.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Similarity must be strictly above this for a keyword-only topic hit.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Which path produced a cache hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact fixed phrase (greeting, farewell, thanks, ...).
    Phrase,
    /// One of a rule's regular expressions.
    Pattern,
    /// A topic's phrasing variation.
    Topic,
    /// Topic keywords present and word overlap above the threshold.
    Similarity,
    /// Small arithmetic expression evaluated in place.
    Arithmetic,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchKind::Phrase => "phrase",
            MatchKind::Pattern => "pattern",
            MatchKind::Topic => "topic",
            MatchKind::Similarity => "similarity",
            MatchKind::Arithmetic => "arithmetic",
        };
        write!(f, "{s}")
    }
}

/// How a rule recognises its input.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Equality against any of the phrases.
    ExactPhrase(Vec<String>),
    /// Unanchored search with each regex, in order.
    RegexSet(Vec<Regex>),
    /// Keyword pre-filter, then phrasing variations, then word overlap.
    KeywordsWithVariations {
        keywords: Vec<String>,
        variations: Vec<Regex>,
    },
}

/// A successful rule match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch<'a> {
    pub rule: &'a str,
    pub kind: MatchKind,
    pub response: &'a str,
}

/// One recognisable input shape and its canned answer.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    matcher: Matcher,
    response: String,
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl PatternRule {
    pub fn exact<I, S>(name: impl Into<String>, phrases: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            matcher: Matcher::ExactPhrase(phrases.into_iter().map(Into::into).collect()),
            response: response.into(),
        }
    }

    /// Build a regex rule. Patterns are compiled case-insensitively.
    pub fn regex_set(
        name: impl Into<String>,
        patterns: &[&str],
        response: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let compiled = patterns.iter().map(|p| compile(p)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            matcher: Matcher::RegexSet(compiled),
            response: response.into(),
        })
    }

    /// Build a topic rule from its keywords and phrasing variations.
    pub fn topic(
        name: impl Into<String>,
        keywords: &[&str],
        variations: &[&str],
        response: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let variations = variations.iter().map(|p| compile(p)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            matcher: Matcher::KeywordsWithVariations {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                variations,
            },
            response: response.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Try this rule against an already-normalized message.
    pub fn try_match(&self, normalized: &str) -> Option<RuleMatch<'_>> {
        let kind = match &self.matcher {
            Matcher::ExactPhrase(phrases) => {
                phrases.iter().any(|p| p == normalized).then_some(MatchKind::Phrase)?
            }
            Matcher::RegexSet(patterns) => {
                patterns.iter().any(|re| re.is_match(normalized)).then_some(MatchKind::Pattern)?
            }
            Matcher::KeywordsWithVariations { keywords, variations } => {
                if !keywords.iter().any(|k| normalized.contains(k.as_str())) {
                    return None;
                }
                if variations.iter().any(|re| re.is_match(normalized)) {
                    MatchKind::Topic
                } else if word_overlap(normalized, &keywords.join(" ")) > SIMILARITY_THRESHOLD {
                    MatchKind::Similarity
                } else {
                    return None;
                }
            }
        };
        Some(RuleMatch { rule: &self.name, kind, response: &self.response })
    }
}

/// Coarse bag-of-words similarity between `message` and `keywords`.
///
/// Counts the words of `message` that are a substring of, or contain as a
/// substring, some word of `keywords`, divided by the larger of the two word
/// counts. Short words shared by accident inflate the score; that loss of
/// precision is accepted.
pub fn word_overlap(message: &str, keywords: &str) -> f64 {
    let words: Vec<&str> = message.split_whitespace().collect();
    let keyword_words: Vec<&str> = keywords.split_whitespace().collect();
    let denominator = words.len().max(keyword_words.len());
    if denominator == 0 {
        return 0.0;
    }

    let matched = words
        .iter()
        .filter(|w| keyword_words.iter().any(|k| k.contains(**w) || w.contains(*k)))
        .count();

    matched as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prime_topic() -> PatternRule {
        PatternRule::topic(
            "primos",
            &["numero", "primo", "primos", "numeros"],
            &[r"numeros?\s+primos?"],
            "primes",
        )
        .unwrap()
    }

    #[test]
    fn test_exact_phrase_requires_equality() {
        let rule = PatternRule::exact("greeting", ["hola", "hey"], "hi there");
        assert_eq!(rule.try_match("hola").map(|m| m.kind), Some(MatchKind::Phrase));
        assert!(rule.try_match("hola amigo").is_none());
    }

    #[test]
    fn test_regex_set_searches_unanchored() {
        let rule = PatternRule::regex_set("tablas", &[r"tabla del? \d+"], "tables").unwrap();
        let m = rule.try_match("dime la tabla del 7 porfa").unwrap();
        assert_eq!(m.kind, MatchKind::Pattern);
        assert_eq!(m.response, "tables");
        assert_eq!(m.rule, "tablas");
    }

    #[test]
    fn test_invalid_regex_is_error() {
        assert!(PatternRule::regex_set("bad", &["("], "x").is_err());
    }

    #[test]
    fn test_topic_variation_hit() {
        let rule = prime_topic();
        let m = rule.try_match("que son los numeros primos").unwrap();
        assert_eq!(m.kind, MatchKind::Topic);
    }

    #[test]
    fn test_topic_without_keywords_skips() {
        assert!(prime_topic().try_match("hablame de los planetas").is_none());
    }

    #[test]
    fn test_topic_similarity_fallback() {
        // No "numero primo" ordering, but every word overlaps: 3 / max(3, 4).
        let rule = prime_topic();
        let m = rule.try_match("primos primo numeros").unwrap();
        assert_eq!(m.kind, MatchKind::Similarity);
    }

    #[test]
    fn test_topic_keyword_but_low_overlap_misses() {
        assert!(prime_topic().try_match("mi primo vive en lima con su familia").is_none());
    }

    #[test]
    fn test_word_overlap_uses_larger_denominator() {
        // 1 matching word, max(2, 4) = 4.
        let s = word_overlap("primo hola", "numero primo primos numeros");
        assert!((s - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_word_overlap_substring_both_directions() {
        // "planetas" contains "planeta"; "sol" is contained in "solar".
        let s = word_overlap("planetas sol", "planeta solar");
        assert!((s - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_word_overlap_empty_inputs() {
        assert_eq!(word_overlap("", ""), 0.0);
        assert_eq!(word_overlap("", "agua ciclo"), 0.0);
    }

    #[test]
    fn test_match_kind_display() {
        assert_eq!(MatchKind::Similarity.to_string(), "similarity");
        assert_eq!(MatchKind::Arithmetic.to_string(), "arithmetic");
    }
}
