//! DOCX backend via `docx-rs`.
//!
//! Body paragraphs come first, in document order, then every table. Word
//! heading styles become markdown headings one level deeper than their
//! style number, so `Heading 1` lands under the document title as `##`.
//!
//! ```text
//! Heading 2 "Quota"        →  "\n### Quota\n\n"
//! Normal    "Paid monthly" →  "Paid monthly\n\n"
//! Table row [Tier, Rate]   →  "| Tier | Rate |\n"
//! ```

use super::TextExtractor;
use crate::error::BackendError;
use docx_rs::{
    Document, DocumentChild, Paragraph, ParagraphChild, Run, RunChild, Table, TableCell, TableCellContent,
    TableChild, TableRowChild,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub const NAME: &str = "docx-rs";

/// Deepest markdown heading level.
const MAX_HEADING_LEVEL: usize = 6;

/// Matches both the style id (`Heading2`) and the display name (`Heading 2`).
static RE_HEADING_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^heading\s*(\d+)$").unwrap());

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extract(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path).map_err(|e| BackendError::new(NAME, e.to_string()))?;
        let docx = docx_rs::read_docx(&bytes).map_err(|e| BackendError::new(NAME, e.to_string()))?;
        Ok(render_document(&docx.document))
    }
}

/// Heading number of a paragraph style, if it is a heading style.
pub fn heading_level(style: &str) -> Option<usize> {
    RE_HEADING_STYLE
        .captures(style.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Flatten a parsed document to text with markdown headings and tables.
pub fn render_document(document: &Document) -> String {
    let mut out = String::new();
    for child in &document.children {
        if let DocumentChild::Paragraph(p) = child {
            push_paragraph(p, &mut out);
        }
    }
    for child in &document.children {
        if let DocumentChild::Table(t) = child {
            push_table(t, &mut out);
        }
    }
    out
}

fn push_paragraph(p: &Paragraph, out: &mut String) {
    let text = paragraph_text(p);
    let level = p.property.style.as_ref().and_then(|s| heading_level(&s.val));

    match level {
        // Headings are kept even when empty.
        Some(level) => {
            out.push('\n');
            out.push_str(&"#".repeat(level.saturating_add(1).min(MAX_HEADING_LEVEL)));
            out.push(' ');
            out.push_str(&text);
            out.push_str("\n\n");
        }
        None if !text.trim().is_empty() => {
            out.push_str(&text);
            out.push_str("\n\n");
        }
        None => {}
    }
}

fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();
    for child in &p.children {
        push_paragraph_child(child, &mut text);
    }
    text
}

fn push_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => push_run(run, out),
        ParagraphChild::Hyperlink(link) => {
            for c in &link.children {
                push_paragraph_child(c, out);
            }
        }
        _ => {}
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// A leading blank line, one `| a | b |` line per row, a trailing blank line.
fn push_table(table: &Table, out: &mut String) {
    out.push('\n');
    for row in &table.rows {
        let TableChild::TableRow(tr) = row;
        let cells: Vec<String> = tr
            .cells
            .iter()
            .map(|cell| {
                let TableRowChild::TableCell(tc) = cell;
                cell_text(tc)
            })
            .collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }
    out.push('\n');
}

fn cell_text(cell: &TableCell) -> String {
    cell.children
        .iter()
        .filter_map(|c| match c {
            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, TableRow};

    fn para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    #[test]
    fn heading_levels_from_style() {
        assert_eq!(heading_level("Heading1"), Some(1));
        assert_eq!(heading_level("Heading 2"), Some(2));
        assert_eq!(heading_level("heading 9"), Some(9));
        assert_eq!(heading_level("Title"), None);
        assert_eq!(heading_level("HeadingChar"), None);
    }

    #[test]
    fn paragraphs_and_headings() {
        let docx = Docx::new()
            .add_paragraph(para("Plan Overview").style("Heading1"))
            .add_paragraph(para("This plan covers reps."))
            .add_paragraph(para("   "))
            .add_paragraph(para("Quota").style("Heading2"));
        assert_eq!(
            render_document(&docx.document),
            "\n## Plan Overview\n\nThis plan covers reps.\n\n\n### Quota\n\n"
        );
    }

    #[test]
    fn deep_headings_are_capped() {
        let docx = Docx::new().add_paragraph(para("Fine print").style("Heading6"));
        assert_eq!(render_document(&docx.document), "\n###### Fine print\n\n");
    }

    #[test]
    fn absurd_heading_level_is_capped() {
        let style = format!("Heading{}", usize::MAX);
        assert_eq!(heading_level(&style), Some(usize::MAX));
        let docx = Docx::new().add_paragraph(para("Fine print").style(&style));
        assert_eq!(render_document(&docx.document), "\n###### Fine print\n\n");
    }

    #[test]
    fn empty_heading_is_kept() {
        let docx = Docx::new().add_paragraph(Paragraph::new().style("Heading1"));
        assert_eq!(render_document(&docx.document), "\n## \n\n");
    }

    #[test]
    fn runs_are_concatenated() {
        let p = Paragraph::new()
            .add_run(Run::new().add_text("Base"))
            .add_run(Run::new().add_tab().add_text("Salary"));
        let docx = Docx::new().add_paragraph(p);
        assert_eq!(render_document(&docx.document), "Base\tSalary\n\n");
    }

    #[test]
    fn tables_follow_paragraphs() {
        let table = Table::new(vec![
            TableRow::new(vec![
                TableCell::new().add_paragraph(para("Tier")),
                TableCell::new().add_paragraph(para(" Rate ")),
            ]),
            TableRow::new(vec![
                TableCell::new().add_paragraph(para("1")),
                TableCell::new().add_paragraph(para("4%")),
            ]),
        ]);
        let docx = Docx::new()
            .add_table(table)
            .add_paragraph(para("After the table in the file."));
        assert_eq!(
            render_document(&docx.document),
            "After the table in the file.\n\n\n| Tier | Rate |\n| 1 | 4% |\n\n"
        );
    }

    #[test]
    fn reads_packed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.docx");
        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(para("Eligibility").style("Heading2"))
            .add_paragraph(para("Full-time reps only."))
            .build()
            .pack(file)
            .unwrap();

        let text = DocxExtractor.extract(&path).unwrap();
        assert!(text.contains("### Eligibility"), "got: {text:?}");
        assert!(text.contains("Full-time reps only."));
    }

    #[test]
    fn not_a_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.docx");
        std::fs::write(&path, b"plain text").unwrap();
        assert_eq!(DocxExtractor.extract(&path).unwrap_err().backend, NAME);
    }
}
