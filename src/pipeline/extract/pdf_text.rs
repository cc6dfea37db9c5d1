//! Fallback PDF backend: pure-Rust `pdf-extract`.
//!
//! Needs no native library, so it is always available when compiled in.
//! It panics on some malformed inputs; the panic is caught and reported as
//! a backend error so one bad file cannot abort the batch.

use super::TextExtractor;
use crate::error::BackendError;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

pub const NAME: &str = "pdf-extract";

pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extract(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path).map_err(|e| BackendError::new(NAME, e.to_string()))?;

        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(BackendError::new(NAME, e.to_string())),
            Err(_) => Err(BackendError::new(NAME, "parser panicked on malformed PDF")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn write_pdf(path: &Path, text: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn reads_text_from_a_real_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.pdf");
        write_pdf(&path, "Quarterly accelerators apply");

        let text = PdfTextExtractor.extract(&path).unwrap();
        assert!(text.contains("Quarterly"), "got: {text:?}");
        assert!(text.contains("accelerators"), "got: {text:?}");
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not a real pdf").unwrap();
        let err = PdfTextExtractor.extract(&path).unwrap_err();
        assert_eq!(err.backend, NAME);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PdfTextExtractor.extract(Path::new("/nonexistent/plan.pdf")).unwrap_err();
        assert_eq!(err.backend, NAME);
    }
}
