//! Recovers JSON from model output that is truncated or slightly malformed.
//!
//! `repair` runs a fixed ladder of deterministic strategies, re-parsing after
//! each one, and gives up after [`MAX_REPAIR_ATTEMPTS`]. Well-formed input is
//! returned straight from the first parse.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

pub const MAX_REPAIR_ATTEMPTS: u32 = 5;

/// Upper bound on truncation points tried by the last-resort prefix search.
const MAX_SUBSET_PROBES: usize = 1024;
/// Total prefix bytes the last-resort search may re-scan. Long inputs get fewer probes.
const SUBSET_SCAN_BUDGET: usize = 16 * 1024 * 1024;
/// Duplicate-closer collapse runs at most this many times.
const CLOSER_COLLAPSE_PASSES: usize = 3;

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("valid trailing comma regex"));
static MISSING_SIBLING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([}\]])(\s*)([{\[])").expect("valid sibling comma regex"));

/// Structured parser failure: where it happened and what the parser said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Byte offset into the parsed text, when the parser reported one.
    pub offset: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("JSON could not be repaired after {attempts} attempts: {last_error}")]
    Unparsable {
        attempts: u32,
        last_error: ParseError,
        /// Final text the ladder produced, for diagnostics only.
        candidate: String,
    },
}

/// Parses `text` and converts serde's line/column into a byte offset.
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str::<Value>(text).map_err(|e| ParseError {
        offset: byte_offset(text, e.line(), e.column()),
        message: e.to_string(),
    })
}

fn byte_offset(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start = if line == 1 {
        0
    } else {
        text.match_indices('\n').nth(line - 2).map(|(i, _)| i + 1)?
    };
    Some((line_start + column.saturating_sub(1)).min(text.len()))
}

/// Text under repair, with its attempt budget.
#[derive(Debug, Clone)]
struct RepairCandidate {
    text: String,
    attempts: u32,
    last_error: Option<ParseError>,
}

impl RepairCandidate {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attempts: 0,
            last_error: None,
        }
    }

    fn exhausted(&self) -> bool {
        self.attempts >= MAX_REPAIR_ATTEMPTS
    }

    fn try_parse(&mut self) -> Option<Value> {
        if self.exhausted() {
            return None;
        }
        self.attempts += 1;
        match parse_json(&self.text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!(
                    "repair attempt {} failed at {:?}: {}",
                    self.attempts,
                    e.offset,
                    e.message
                );
                self.last_error = Some(e);
                None
            }
        }
    }

    fn into_failure(self) -> RepairError {
        RepairError::Unparsable {
            attempts: self.attempts,
            last_error: self.last_error.unwrap_or_else(|| ParseError {
                offset: None,
                message: "no parse attempted".to_string(),
            }),
            candidate: self.text,
        }
    }
}

pub fn repair(text: &str) -> Result<Value, RepairError> {
    let mut candidate = RepairCandidate::new(text);

    if let Some(value) = candidate.try_parse() {
        return Ok(value);
    }

    candidate.text = cleanup_syntax(&normalize_structure(&candidate.text));
    if let Some(value) = candidate.try_parse() {
        return Ok(value);
    }

    let with_comma = candidate
        .last_error
        .as_ref()
        .and_then(|e| e.offset)
        .and_then(|offset| insert_comma_at(&candidate.text, offset));
    if let Some(fixed) = with_comma {
        candidate.text = fixed;
        if let Some(value) = candidate.try_parse() {
            return Ok(value);
        }
    }

    let cleaned = cleanup_syntax(&candidate.text);
    if cleaned != candidate.text {
        candidate.text = cleaned;
        if let Some(value) = candidate.try_parse() {
            return Ok(value);
        }
    }

    if !candidate.exhausted() {
        candidate.attempts += 1;
        if let Some(value) = extract_valid_subset(&candidate.text) {
            return Ok(value);
        }
    }

    Err(candidate.into_failure())
}

/// Escapes raw line breaks inside strings, closes an unterminated string and
/// appends whatever closers are still owed. Never removes characters.
pub fn normalize_structure(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_string = false;
    let mut escaped = false;
    let mut owed = OwedClosers::default();

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
                match ch {
                    '\n' => out.push('n'),
                    '\r' => out.push('r'),
                    '\t' => out.push('t'),
                    _ => out.push(ch),
                }
                continue;
            }
            match ch {
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => owed.push('}'),
            '[' => owed.push(']'),
            '}' | ']' => {
                if owed.last() == Some(ch) {
                    owed.pop();
                } else if let Some(depth) = owed.deepest(ch) {
                    // A stray closer followed by the one we expect is surplus and is
                    // left for cleanup; otherwise it closes an outer container early.
                    let next = text[i + ch.len_utf8()..]
                        .chars()
                        .find(|c| !c.is_whitespace() && *c != ',');
                    if next != owed.last() {
                        while owed.len() > depth + 1 {
                            if let Some(inner) = owed.pop() {
                                out.push(inner);
                            }
                        }
                        owed.pop();
                    }
                }
            }
            _ => {}
        }
        out.push(ch);
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    while let Some(closer) = owed.pop() {
        out.push(closer);
    }
    out
}

/// Stack of closers still owed, with the position of the innermost `}` and `]`
/// kept alongside so a stray closer finds its partner without a scan.
#[derive(Debug, Default)]
struct OwedClosers {
    stack: Vec<char>,
    braces: Vec<usize>,
    brackets: Vec<usize>,
}

impl OwedClosers {
    fn push(&mut self, closer: char) {
        let depth = self.stack.len();
        match closer {
            '}' => self.braces.push(depth),
            _ => self.brackets.push(depth),
        }
        self.stack.push(closer);
    }

    fn pop(&mut self) -> Option<char> {
        let closer = self.stack.pop()?;
        match closer {
            '}' => self.braces.pop(),
            _ => self.brackets.pop(),
        };
        Some(closer)
    }

    fn last(&self) -> Option<char> {
        self.stack.last().copied()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    /// Stack index of the innermost open container that `closer` would close.
    fn deepest(&self, closer: char) -> Option<usize> {
        match closer {
            '}' => self.braces.last().copied(),
            _ => self.brackets.last().copied(),
        }
    }
}

/// Regex-level cleanups, applied only outside string literals.
pub fn cleanup_syntax(text: &str) -> String {
    let mut current = map_structural(text, |s| {
        let once = TRAILING_COMMA.replace_all(s, "$1");
        TRAILING_COMMA.replace_all(&once, "$1").into_owned()
    });

    for _ in 0..CLOSER_COLLAPSE_PASSES {
        match collapse_excess_closers(&current) {
            Some(next) => current = next,
            None => break,
        }
    }

    map_structural(&current, |s| {
        MISSING_SIBLING_COMMA.replace_all(s, "$1,$2$3").into_owned()
    })
}

/// Inserts a comma before `offset` when the parser stopped right after a
/// complete value and right before the start of the next one.
fn insert_comma_at(text: &str, offset: usize) -> Option<String> {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    let mut pos = offset;
    while pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
        pos -= 1;
    }
    if pos == 0 || !text.is_char_boundary(pos) || inside_string(&text[..pos]) {
        return None;
    }

    let previous = text[..pos].chars().next_back()?;
    if matches!(previous, '{' | '[' | ',' | ':') {
        return None;
    }

    let next = text[pos..].chars().find(|c| !c.is_whitespace())?;
    let starts_value =
        matches!(next, '"' | '{' | '[' | '-' | 't' | 'f' | 'n') || next.is_ascii_digit();
    if !starts_value {
        return None;
    }

    let mut fixed = String::with_capacity(text.len() + 1);
    fixed.push_str(&text[..pos]);
    fixed.push(',');
    fixed.push_str(&text[pos..]);
    Some(fixed)
}

/// Last resort: the longest prefix ending on `}`, `]` or `"` that repairs cleanly.
/// The text was already cleaned by the earlier rungs, so each prefix only has
/// its owed closers appended.
fn extract_valid_subset(text: &str) -> Option<Value> {
    let probes = (SUBSET_SCAN_BUDGET / text.len().max(1)).clamp(1, MAX_SUBSET_PROBES);
    let cut_points = text
        .char_indices()
        .rev()
        .filter(|(_, c)| matches!(c, '}' | ']' | '"'))
        .take(probes);

    for (index, ch) in cut_points {
        let prefix = &text[..index + ch.len_utf8()];
        if let Ok(value) = parse_json(&normalize_structure(prefix)) {
            log::debug!("recovered JSON prefix of {} bytes", prefix.len());
            return Some(value);
        }
    }
    None
}

/// Drops closers that outnumber their openers, taking them from runs of
/// duplicates (`}}`, `} , }`) from the right. One scan over the text.
fn collapse_excess_closers(text: &str) -> Option<String> {
    let structural: Vec<Segment<'_>> = segments(text).into_iter().filter(|s| !s.quoted).collect();

    let (mut braces, mut brackets) = (0i64, 0i64);
    for segment in &structural {
        for byte in segment.text.bytes() {
            match byte {
                b'{' => braces -= 1,
                b'}' => braces += 1,
                b'[' => brackets -= 1,
                b']' => brackets += 1,
                _ => {}
            }
        }
    }
    if braces <= 0 && brackets <= 0 {
        return None;
    }

    // byte ranges to drop, collected right to left
    let mut removed: Vec<(usize, usize)> = Vec::new();
    for segment in structural.iter().rev() {
        let bytes = segment.text.as_bytes();
        let mut j = bytes.len();
        while j > 0 && (braces > 0 || brackets > 0) {
            j -= 1;
            let closer = bytes[j];
            let surplus = match closer {
                b'}' => &mut braces,
                b']' => &mut brackets,
                _ => continue,
            };
            if *surplus <= 0 {
                continue;
            }

            let mut k = j;
            while k > 0 && bytes[k - 1].is_ascii_whitespace() {
                k -= 1;
            }
            if k > 0 && bytes[k - 1] == b',' {
                k -= 1;
                while k > 0 && bytes[k - 1].is_ascii_whitespace() {
                    k -= 1;
                }
            }
            if k > 0 && bytes[k - 1] == closer {
                removed.push((segment.start + k, segment.start + j + 1));
                *surplus -= 1;
                j = k;
            }
        }
    }
    if removed.is_empty() {
        return None;
    }

    // only ASCII bytes are dropped, so every cut is a char boundary
    let mut fixed = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in removed.into_iter().rev() {
        fixed.push_str(&text[cursor..start]);
        cursor = end;
    }
    fixed.push_str(&text[cursor..]);
    Some(fixed)
}

#[derive(Debug)]
struct Segment<'a> {
    start: usize,
    text: &'a str,
    quoted: bool,
    closed: bool,
}

/// Splits text into alternating structural runs and string literals
/// (quotes included). An unterminated literal runs to the end.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                out.push(Segment {
                    start,
                    text: &text[start..=i],
                    quoted: true,
                    closed: true,
                });
                start = i + 1;
                in_string = false;
            }
        } else if ch == '"' {
            if i > start {
                out.push(Segment {
                    start,
                    text: &text[start..i],
                    quoted: false,
                    closed: true,
                });
            }
            start = i;
            in_string = true;
        }
    }
    if start < text.len() {
        out.push(Segment {
            start,
            text: &text[start..],
            quoted: in_string,
            closed: !in_string,
        });
    }
    out
}

fn map_structural(text: &str, f: impl Fn(&str) -> String) -> String {
    segments(text)
        .iter()
        .map(|s| if s.quoted { s.text.to_string() } else { f(s.text) })
        .collect()
}

fn inside_string(prefix: &str) -> bool {
    segments(prefix).last().is_some_and(|s| s.quoted && !s.closed)
}
