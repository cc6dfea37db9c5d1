//! Section detection: promote heading-like lines to markdown headings.
//!
//! Compensation plans are numbered documents ("1. Eligibility",
//! "a) Base Salary") whose headings survive text extraction only as plain
//! lines. Each line is classified on its trimmed content; the first
//! matching rule wins and there is no look-ahead or backtracking:
//!
//! | Rule | Pattern | Output |
//! |------|---------|--------|
//! | blank | empty after trim | unchanged |
//! | numbered | `^\d+\.[\d\s]*[A-Z][^.]*$` | `\n## {line}\n` |
//! | lettered | `^[a-z][\)\.]\s+[A-Z]` | `\n### {line}\n` |
//! | caps | all-caps, < 80 chars, no 4-digit run | `\n## {Title Case}\n` |
//! | other | — | unchanged |
//!
//! The rules are heuristics with known false positives: an all-caps table
//! cell becomes a heading.
//!
//! Trimming uses Unicode `White_Space` and the caps test uses the
//! `Uppercase`/`Lowercase` properties. Outside ASCII and Latin-1 this can
//! differ from other tools: the information separators U+001C..U+001F are
//! kept as content rather than trimmed, titlecase digraphs such as `ǅ`
//! count as uncased, and a title-cased word never gets a final sigma.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lines this long or longer are never treated as all-caps headings.
pub const MAX_CAPS_HEADING_CHARS: usize = 80;

static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.[\d\s]*[A-Z][^.]*$").unwrap());
static RE_LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][\)\.]\s+[A-Z]").unwrap());
static RE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// Which rule a line matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// "1. Purpose", "2.1 Quota Credit"
    NumberedHeading,
    /// "a) Base Salary", "b. Incentive"
    LetteredHeading,
    /// "ELIGIBILITY REQUIREMENTS"
    CapsHeading,
}

impl LineKind {
    /// Markdown heading level, if the line becomes a heading.
    pub fn heading_level(self) -> Option<usize> {
        match self {
            LineKind::Blank => None,
            LineKind::NumberedHeading | LineKind::CapsHeading => Some(2),
            LineKind::LetteredHeading => Some(3),
        }
    }
}

/// Classify one line. `None` means the line passes through untouched.
pub fn classify_line(line: &str) -> Option<LineKind> {
    let s = line.trim();
    if s.is_empty() {
        Some(LineKind::Blank)
    } else if RE_NUMBERED.is_match(s) {
        Some(LineKind::NumberedHeading)
    } else if RE_LETTERED.is_match(s) {
        Some(LineKind::LetteredHeading)
    } else if is_all_caps(s) && s.chars().count() < MAX_CAPS_HEADING_CHARS && !RE_YEAR.is_match(s) {
        Some(LineKind::CapsHeading)
    } else {
        None
    }
}

/// Render one line according to its classification.
pub fn render_line(line: &str) -> String {
    let s = line.trim();
    match classify_line(line) {
        Some(LineKind::NumberedHeading) => format!("\n## {s}\n"),
        Some(LineKind::LetteredHeading) => format!("\n### {s}\n"),
        Some(LineKind::CapsHeading) => format!("\n## {}\n", title_case(s)),
        Some(LineKind::Blank) | None => line.to_string(),
    }
}

/// Apply [`render_line`] to every line of `text`.
pub fn detect_sections(text: &str) -> String {
    text.split('\n').map(render_line).collect::<Vec<_>>().join("\n")
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// At least one cased character and no lowercase ones ("Q4 SPIFF" counts).
fn is_all_caps(s: &str) -> bool {
    s.chars().any(is_cased) && !s.chars().any(char::is_lowercase)
}

/// Uppercase the first letter of every cased run, lowercase the rest.
///
/// Word boundaries are any non-cased character, so `"ON-TARGET"` becomes
/// `"On-Target"` and `"Q4"` stays `"Q4"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if is_cased(c) {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
