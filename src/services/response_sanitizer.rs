//! Cleans assistant text before it reaches the transcript.
//!
//! The model's prose may carry reasoning blocks, notes to self, raw code and
//! tool vocabulary, and it sometimes loops on the same line. Each step below
//! is idempotent on its own output; the whole pass never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::patterns::{PRIVATE_NOTE_END, PRIVATE_NOTE_START};
use crate::services::pattern_table::{
    normalize_for_matching, PatternTable, CONFIRMATION_TABLE, LEAK_TABLE,
};

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid think regex"));
// A reply cut off mid-reasoning leaves an opening tag with no partner.
static UNCLOSED_THINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*$").expect("valid think regex"));
static STRAY_THINK_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</think>").expect("valid think regex"));
static PRIVATE_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is){}.*?{}",
        regex::escape(PRIVATE_NOTE_START),
        regex::escape(PRIVATE_NOTE_END)
    ))
    .expect("valid private note regex")
});
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("valid fence regex"));
static UNCLOSED_CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*$").expect("valid fence regex"));

#[derive(Debug, Clone)]
pub struct ResponseSanitizer {
    leak_patterns: PatternTable,
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self {
            leak_patterns: LEAK_TABLE.clone(),
        }
    }
}

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the built-in leak table, e.g. from configuration.
    pub fn with_additional_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.leak_patterns = self.leak_patterns.with_additional(patterns);
        self
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let text = strip_regions(raw);
        let kept = self.filter_leak_lines(&text);
        let deduped = suppress_repetition(&kept);
        deduped.join("\n").trim().to_string()
    }

    fn filter_leak_lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split('\n')
            .filter(|line| {
                line.trim().is_empty()
                    || !self.leak_patterns.matches_any(&normalize_for_matching(line))
            })
            .collect()
    }
}

/// Sanitizes with the built-in pattern tables only.
pub fn sanitize(raw: &str) -> String {
    ResponseSanitizer::default().sanitize(raw)
}

fn strip_regions(raw: &str) -> String {
    let text = THINK_BLOCK.replace_all(raw, "");
    let text = UNCLOSED_THINK.replace_all(&text, "");
    let text = STRAY_THINK_CLOSE.replace_all(&text, "");
    let text = PRIVATE_NOTE.replace_all(&text, "");
    let text = CODE_FENCE.replace_all(&text, "");
    let text = UNCLOSED_CODE_FENCE.replace_all(&text, "");
    text.into_owned()
}

fn suppress_repetition<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut output = Vec::with_capacity(lines.len());
    // last two non-blank lines emitted
    let mut previous: [Option<&str>; 2] = [None, None];
    let mut confirmation_seen = false;

    for &line in lines {
        if line.trim().is_empty() {
            output.push(line);
            continue;
        }

        if CONFIRMATION_TABLE.matches_any(&normalize_for_matching(line)) {
            if confirmation_seen {
                continue;
            }
            confirmation_seen = true;
        }

        if previous[0] == Some(line) && previous[1] == Some(line) {
            continue;
        }

        output.push(line);
        previous = [previous[1], Some(line)];
    }

    output
}
