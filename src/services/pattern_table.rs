use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::constants::patterns::{
    CONFIRMATION_PATTERNS, FAKE_DOMAINS, LEAK_PATTERNS, NULLISH_TOKENS, PLACEHOLDER_KEYWORDS,
    PLACEHOLDER_QUALIFIERS,
};

/// A named, ordered list of compiled patterns.
#[derive(Debug, Clone)]
pub struct PatternTable {
    name: &'static str,
    patterns: Vec<Regex>,
}

impl PatternTable {
    /// Compiles built-in patterns. These are constants, so a bad entry is a programming error.
    pub fn from_static(name: &'static str, sources: &[&str]) -> Self {
        let patterns = sources
            .iter()
            .map(|source| {
                Regex::new(source)
                    .unwrap_or_else(|e| panic!("built-in pattern table '{name}' has bad entry {source:?}: {e}"))
            })
            .collect();
        Self { name, patterns }
    }

    /// Appends runtime-supplied patterns, skipping (and logging) any that fail to compile.
    pub fn with_additional<S: AsRef<str>>(mut self, sources: &[S]) -> Self {
        for source in sources {
            let source = source.as_ref();
            match Regex::new(source) {
                Ok(re) => self.patterns.push(re),
                Err(e) => log::warn!(
                    "Skipping invalid pattern {:?} for table '{}': {}",
                    source,
                    self.name,
                    e
                ),
            }
        }
        log::debug!("pattern table '{}' has {} entries", self.name, self.patterns.len());
        self
    }

    /// True when any pattern in the table matches `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

pub static LEAK_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("leak", LEAK_PATTERNS));
pub static CONFIRMATION_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("confirmation", CONFIRMATION_PATTERNS));
pub static NULLISH_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("nullish", NULLISH_TOKENS));
pub static PLACEHOLDER_KEYWORD_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("placeholder_keyword", PLACEHOLDER_KEYWORDS));
pub static PLACEHOLDER_QUALIFIER_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("placeholder_qualifier", PLACEHOLDER_QUALIFIERS));
pub static FAKE_DOMAIN_TABLE: Lazy<PatternTable> =
    Lazy::new(|| PatternTable::from_static("fake_domain", FAKE_DOMAINS));

/// Strips diacritics and lower-cases, so "Usuário Confirmou" matches "usuario confirmou".
pub fn normalize_for_matching(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
