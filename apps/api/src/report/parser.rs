//! Grant Text Parser: carves free-form research text into `GrantRecord`s.
//!
//! Two independent stages:
//! - boundary detection (`SectionSplitter`): full text → section spans
//! - field extraction: one labelled-field table scanned by a single routine
//!
//! The parser never fails. Text without recognisable structure yields fewer
//! (or zero) records.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::report::models::GrantRecord;

/// Sections shorter than this (trimmed, in chars) are treated as noise.
pub const MIN_SECTION_CHARS: usize = 50;

/// Blank line, then a list marker or a `Grant`/`Foundation` lead word.
static BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r?\n[ \t]*\r?\n(\d+\.|Grant|Foundation)").expect("boundary pattern is valid")
});

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("list marker pattern is valid"));

static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:grant|foundation):\s*").expect("title prefix pattern is valid")
});

// ────────────────────────────────────────────────────────────────────────────
// Boundary detection
// ────────────────────────────────────────────────────────────────────────────

/// Decides where one grant's text ends and the next begins.
///
/// Returns byte spans into `text`, in source order. Spans that fall outside
/// the text or off a char boundary are skipped by the parser.
pub trait SectionSplitter {
    fn split(&self, text: &str) -> Vec<Range<usize>>;
}

impl<F> SectionSplitter for F
where
    F: Fn(&str) -> Vec<Range<usize>>,
{
    fn split(&self, text: &str) -> Vec<Range<usize>> {
        self(text)
    }
}

/// Default heuristic: a new entry starts after a blank line when the next line
/// opens with `<digits>.`, `Grant` or `Foundation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerSplitter;

impl SectionSplitter for MarkerSplitter {
    fn split(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut start = 0;

        for caps in BOUNDARY.captures_iter(text) {
            let (Some(whole), Some(marker)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            spans.push(start..whole.start());
            start = marker.start();
        }
        spans.push(start..text.len());
        spans
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrantField {
    Organization,
    Amount,
    Deadline,
}

/// Accepted labels per field. A label matches case-insensitively as `<label>:`.
const FIELD_LABELS: &[(GrantField, &[&str])] = &[
    (
        GrantField::Organization,
        &["Foundation", "Organization", "Funder"],
    ),
    (GrantField::Amount, &["Amount", "Funding", "Grant Size"]),
    (GrantField::Deadline, &["Deadline", "Due", "Application Due"]),
];

static FIELD_PATTERNS: Lazy<Vec<(GrantField, Regex)>> = Lazy::new(|| {
    FIELD_LABELS
        .iter()
        .map(|(field, labels)| (*field, label_pattern(labels)))
        .collect()
});

fn label_pattern(labels: &[&str]) -> Regex {
    let alternatives = labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives}):[ \t]*([^\r\n]*)"))
        .expect("field label pattern is valid")
}

/// Value of the first labelled line in `section`. Empty values do not count.
fn first_labeled_value(pattern: &Regex, section: &str) -> Option<String> {
    pattern
        .captures_iter(section)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty())
        .map(String::from)
}

fn extract_title(section: &str) -> Option<String> {
    let first_line = section.lines().map(str::trim).find(|l| !l.is_empty())?;
    let without_marker = LIST_MARKER.replace(first_line, "");
    let title = TITLE_PREFIX.replace(&without_marker, "");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

/// Grant parser parameterised by its boundary strategy.
#[derive(Debug, Clone, Default)]
pub struct GrantParser<S = MarkerSplitter> {
    splitter: S,
}

impl<S: SectionSplitter> GrantParser<S> {
    pub fn with_splitter(splitter: S) -> Self {
        Self { splitter }
    }

    pub fn parse(&self, text: &str) -> Vec<GrantRecord> {
        let spans = self.splitter.split(text);
        let candidates = spans.len();

        let records: Vec<GrantRecord> = spans
            .into_iter()
            .filter_map(|span| text.get(span))
            .map(str::trim)
            .filter(|section| section.chars().count() >= MIN_SECTION_CHARS)
            .map(parse_section)
            .collect();

        debug!(
            "Grant parser kept {} of {} candidate sections",
            records.len(),
            candidates
        );
        records
    }
}

/// Parses `text` with the default marker heuristic.
pub fn parse_grants(text: &str) -> Vec<GrantRecord> {
    GrantParser::with_splitter(MarkerSplitter).parse(text)
}

fn parse_section(section: &str) -> GrantRecord {
    let mut record = GrantRecord {
        raw_section: section.to_string(),
        title: extract_title(section),
        organization: None,
        amount: None,
        deadline: None,
        description: section.to_string(),
    };

    for (field, pattern) in FIELD_PATTERNS.iter() {
        let value = first_labeled_value(pattern, section);
        match field {
            GrantField::Organization => record.organization = value,
            GrantField::Amount => record.amount = value,
            GrantField::Deadline => record.deadline = value,
        }
    }

    record
}
