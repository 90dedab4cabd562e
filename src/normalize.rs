//! Deterministic text normalization for corpus documents and queries
//!
//! Normalization is deliberately lenient: it never fails. Absent or
//! malformed input maps to the empty string. The same pass feeds both
//! search queries and display snippets.

use ahash::AHashSet;
use regex::Regex;
use std::sync::OnceLock;

/// Fixed English stop-word table applied as the final normalization step.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

/// Text input that may be absent (e.g. a missing request field).
///
/// `Absent` maps to the empty string under normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    Present(String),
    Absent,
}

impl TextInput {
    pub fn as_str(&self) -> &str {
        match self {
            TextInput::Present(text) => text,
            TextInput::Absent => "",
        }
    }
}

impl From<Option<String>> for TextInput {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => TextInput::Present(text),
            None => TextInput::Absent,
        }
    }
}

/// Text normalizer with precompiled patterns
///
/// Steps, in order, each idempotent: lowercase; strip URLs (scheme-prefixed
/// and bare `www.` tokens); strip email-like tokens; strip everything
/// outside `[a-z\s]`; collapse whitespace; drop stop words. Because the
/// character strip cannot reintroduce anything a prior step removed, the
/// whole pass is idempotent.
#[derive(Debug)]
pub struct Normalizer {
    url_regex: Regex,
    email_regex: Regex,
    non_alpha_regex: Regex,
    whitespace_regex: Regex,
    stop_words: AHashSet<&'static str>,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            // Matches http(s)/ftp URLs and bare www. tokens
            url_regex: Regex::new(r"(?:https?|ftp)://\S+|www\.\S+").unwrap(),
            // Matches email-like tokens
            email_regex: Regex::new(r"\S+@\S+").unwrap(),
            // Everything outside lowercase letters and whitespace
            non_alpha_regex: Regex::new(r"[^a-z\s]").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Get a singleton instance (patterns compile once per process)
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<Normalizer> = OnceLock::new();
        INSTANCE.get_or_init(Normalizer::new)
    }

    /// Normalize text for embedding and display.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let text = self.url_regex.replace_all(&text, " ");
        let text = self.email_regex.replace_all(&text, " ");
        let text = self.non_alpha_regex.replace_all(&text, "");
        let text = self.whitespace_regex.replace_all(&text, " ");

        text.trim()
            .split(' ')
            .filter(|token| !token.is_empty() && !self.stop_words.contains(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize possibly-absent input; `Absent` yields the empty string.
    pub fn normalize_input(&self, input: &TextInput) -> String {
        self.normalize(input.as_str())
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
