//! Document assembly: metadata header + normalised, sectioned body.

use crate::manifest::PlanRecord;
use crate::pipeline::{normalize::normalize, sections::detect_sections};
use std::fmt::Write as _;

/// Build the final markdown for one plan from its raw extracted text.
///
/// Pure function of its inputs; the output is not newline-terminated
/// beyond whatever the body ends with.
pub fn assemble(plan: &PlanRecord, company: &str, raw_text: &str) -> String {
    let body = detect_sections(&normalize(raw_text));
    let mut md = header(plan, company);
    md.push_str(&body);
    md
}

/// The fixed metadata block, ending with a horizontal rule and blank line.
pub fn header(plan: &PlanRecord, company: &str) -> String {
    let mut h = String::with_capacity(256);
    let _ = writeln!(h, "# {}", plan.title);
    h.push('\n');
    for (label, value) in [
        ("Plan Code", plan.document_code.as_str()),
        ("Division", plan.division.as_str()),
        ("Role", plan.role.as_str()),
        ("Effective Date", plan.effective_date.as_str()),
        ("Plan Year", plan.plan_year.as_str()),
        ("Version", plan.version.as_str()),
        ("Status", plan.status.as_str()),
        ("Company", company),
    ] {
        let _ = writeln!(h, "**{label}:** {value}");
    }
    h.push_str("\n---\n\n");
    h
}
