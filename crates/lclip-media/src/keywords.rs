//! Transcript keyword and key-phrase extraction.
//!
//! Two independent text signals feed candidate scoring: single salient
//! terms ranked by frequency, and multi-word phrases ranked RAKE-style
//! (word degree over word frequency, summed per phrase).

use std::collections::HashMap;

use crate::traits::KeywordExtractor;

const TOP_N: usize = 10;

/// Common English stopwords. Shared by both extractors as phrase
/// delimiters and term filters.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had",
    "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "just", "like", "me", "more", "most", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "re",
    "s", "same", "she", "should", "so", "some", "such", "t", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "you", "your", "yours",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Ranks single terms by occurrence count. Ties keep first-seen order, so
/// output is deterministic for a given transcript.
#[derive(Debug, Default)]
pub struct FrequencyKeywordExtractor;

impl FrequencyKeywordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl KeywordExtractor for FrequencyKeywordExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for token in tokenize(text) {
            if token.len() < 3 || is_stopword(&token) {
                continue;
            }
            if !counts.contains_key(&token) {
                first_seen.push(token.clone());
            }
            *counts.entry(token).or_insert(0) += 1;
        }

        let mut ranked: Vec<(usize, usize, String)> = first_seen
            .into_iter()
            .enumerate()
            .map(|(order, word)| (counts[&word], order, word))
            .collect();
        // Highest count first; ties keep first-seen order.
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        ranked.into_iter().take(TOP_N).map(|(_, _, w)| w).collect()
    }
}

/// RAKE-style phrase extractor: transcript text is split into candidate
/// phrases at stopwords and punctuation, each phrase scored by the sum of
/// its words' degree/frequency ratios.
#[derive(Debug, Default)]
pub struct RakePhraseExtractor;

impl RakePhraseExtractor {
    pub fn new() -> Self {
        Self
    }

    fn candidate_phrases(text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();
        for fragment in text.split(|c: char| ".,!?;:()\"".contains(c) || c == '\n') {
            let mut current: Vec<String> = Vec::new();
            for token in tokenize(fragment) {
                if is_stopword(&token) {
                    if !current.is_empty() {
                        phrases.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(token);
                }
            }
            if !current.is_empty() {
                phrases.push(current);
            }
        }
        phrases
    }
}

impl KeywordExtractor for RakePhraseExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        let phrases = Self::candidate_phrases(text);

        let mut freq: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for phrase in &phrases {
            let co_degree = (phrase.len().saturating_sub(1)) as f64;
            for word in phrase {
                *freq.entry(word).or_insert(0.0) += 1.0;
                *degree.entry(word).or_insert(0.0) += co_degree;
            }
        }

        let score_of = |phrase: &[String]| -> f64 {
            phrase
                .iter()
                .map(|w| {
                    let f = freq[w.as_str()];
                    (degree[w.as_str()] + f) / f
                })
                .sum()
        };

        let mut scored: Vec<(f64, usize, String)> = phrases
            .iter()
            .enumerate()
            .map(|(order, phrase)| (score_of(phrase), order, phrase.join(" ")))
            .collect();

        // Highest score first; ties keep transcript order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut seen = std::collections::HashSet::new();
        scored
            .into_iter()
            .filter(|(_, _, phrase)| seen.insert(phrase.clone()))
            .take(TOP_N)
            .map(|(_, _, phrase)| phrase)
            .collect()
    }
}

/// Count how many of `terms` occur in the transcript text of a window.
pub fn count_matches(terms: &[String], window_text: &str) -> usize {
    let haystack = window_text.to_lowercase();
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopword_table_is_sorted() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS, "binary_search needs a sorted table");
    }

    #[test]
    fn test_frequency_extractor_ranks_by_count() {
        let text = "rust makes systems programming fun. rust is fast, rust is safe. \
                    programming in rust feels different from programming in python.";
        let keywords = FrequencyKeywordExtractor::new().extract(text);
        assert_eq!(keywords[0], "rust");
        assert_eq!(keywords[1], "programming");
        assert!(keywords.len() <= 10);
        assert!(!keywords.contains(&"is".to_string()));
    }

    #[test]
    fn test_rake_prefers_long_phrases() {
        let text = "the quick brown fox jumps. a quick brown fox again. the dog sleeps.";
        let phrases = RakePhraseExtractor::new().extract(text);
        assert_eq!(phrases[0], "quick brown fox jumps");
        assert!(phrases.contains(&"quick brown fox again".to_string()));
    }

    #[test]
    fn test_empty_text() {
        assert!(FrequencyKeywordExtractor::new().extract("").is_empty());
        assert!(RakePhraseExtractor::new().extract("").is_empty());
    }

    #[test]
    fn test_count_matches() {
        let terms = vec!["rust".to_string(), "python".to_string()];
        assert_eq!(count_matches(&terms, "I love Rust a lot"), 1);
        assert_eq!(count_matches(&terms, "rust or python"), 2);
        assert_eq!(count_matches(&terms, "nothing here"), 0);
    }
}
