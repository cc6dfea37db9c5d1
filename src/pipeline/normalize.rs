//! Normalisation: deterministic cleanup of raw extracted text.
//!
//! PDF text layers carry artefacts of the printed page: running page
//! numbers, typographic ligatures, curly quotes. DOCX text is cleaner but
//! goes through the same passes so both formats produce comparable output.
//!
//! ## Rule Order
//!
//! 1. Collapse 3+ consecutive newlines to exactly 2
//! 2. Remove isolated `Page <n>` lines
//! 3. Remove isolated lines holding only a number
//! 4. Replace ligatures, dashes and curly quotes with ASCII equivalents
//! 5. Trim the whole text
//!
//! Rules 2 and 3 swallow the whitespace around the removed line (down to a
//! single `\n`) and run to a fixpoint, which is what makes
//! `normalize(normalize(x)) == normalize(x)` hold.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Apply all normalisation rules in order.
pub fn normalize(input: &str) -> String {
    // Pad so the first and last lines count as isolated too; the final trim
    // removes the padding again.
    let s = format!("\n{input}\n");
    let s = collapse_blank_lines(&s);
    let s = remove_page_labels(&s);
    let s = remove_bare_numbers(&s);
    let s = replace_typographic_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rules 2 & 3: Page-number artefacts ───────────────────────────────────────

static RE_PAGE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\n\s*page[ \t]+\d+\s*\n").unwrap());

static RE_BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\d+\s*\n").unwrap());

fn remove_page_labels(input: &str) -> String {
    replace_until_stable(&RE_PAGE_LABEL, input)
}

fn remove_bare_numbers(input: &str) -> String {
    replace_until_stable(&RE_BARE_NUMBER, input)
}

/// Matches consume the newline that would start the next one, so
/// consecutive artefact lines need more than one pass.
fn replace_until_stable(re: &Regex, input: &str) -> String {
    let mut current = input.to_string();
    loop {
        match re.replace_all(&current, "\n") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}

// ── Rule 4: Typographic characters ───────────────────────────────────────────

const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
];

fn replace_typographic_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_page_label_removed() {
        assert_eq!(normalize("Intro\nPage 3\nBody"), "Intro\nBody");
        assert_eq!(normalize("Intro\n  PAGE 12  \nBody"), "Intro\nBody");
    }

    #[test]
    fn test_consecutive_page_labels_removed() {
        assert_eq!(normalize("Intro\nPage 1\npage 2\nBody"), "Intro\nBody");
    }

    #[test]
    fn test_page_label_inside_sentence_kept() {
        let s = "See Page 4 for the quota table.";
        assert_eq!(normalize(s), s);
    }

    #[test]
    fn test_bare_number_lines_removed() {
        assert_eq!(normalize("Quota\n\n7\n\nAttainment"), "Quota\nAttainment");
        assert_eq!(normalize("3\nFirst line"), "First line");
        assert_eq!(normalize("Last line\n42"), "Last line");
    }

    #[test]
    fn test_numbers_within_text_kept() {
        let s = "Tier 2 pays 4% of revenue\n1. Purpose";
        assert_eq!(normalize(s), s);
    }

    #[test]
    fn test_ligatures_dashes_quotes() {
        assert_eq!(
            normalize("e\u{FB03}cient \u{FB01}scal \u{FB02}oor \u{2013} \u{2014} \u{201C}x\u{201D} \u{2018}y\u{2019}"),
            "efficient fiscal floor - - \"x\" 'y'"
        );
    }

    #[test]
    fn test_trims_whole_text() {
        assert_eq!(normalize("\n\n   Plan text   \n\n"), "Plan text");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Title\n\n\n\nPage 1\nPage 2\n\n3\n\n\nBody \u{201C}quoted\u{201D}",
            "1\n2\n3\n4",
            "  \n 5 \n\n\nText\n\t\nPage 9\n\n\n\n",
            "a\n \n \n \nb",
            "\u{FB01}rst\n\n\n12\n\nPAGE 3\n\n\nend",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
