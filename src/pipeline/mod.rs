//! Pipeline stages for plan-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. Only
//! [`extract`] touches the filesystem; the other stages are pure string
//! functions, so a document's output depends on its extracted text, its
//! manifest record and the configured company name, nothing else.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ normalize ──▶ sections ──▶ assemble
//! (pdf/docx)  (cleanup)     (headings)   (header + body)
//! ```
//!
//! 1. [`extract`]   — read a PDF or DOCX into plain text; runs in
//!    `spawn_blocking` because every backend is synchronous
//! 2. [`normalize`] — strip page-number artefacts and typographic characters
//! 3. [`sections`]  — promote heading-like lines to `##` / `###`
//! 4. [`assemble`]  — prepend the metadata header

pub mod assemble;
pub mod extract;
pub mod normalize;
pub mod sections;
