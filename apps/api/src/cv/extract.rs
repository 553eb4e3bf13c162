//! File-type sniffing and plain-text extraction for uploaded CVs.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use bytes::Bytes;
use regex::{Captures, Regex};
use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format. Please upload a PDF or DOCX file.")]
    UnsupportedFormat,

    #[error("File content does not match its {expected} extension")]
    ContentMismatch { expected: &'static str },

    #[error("No text could be extracted from the document")]
    Empty,

    #[error("Could not read document: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
        }
    }

    fn magic(self) -> &'static [u8] {
        match self {
            DocumentKind::Pdf => PDF_MAGIC,
            DocumentKind::Docx => ZIP_MAGIC,
        }
    }
}

/// Decides the document kind from the file name, then checks the leading bytes agree.
pub fn sniff(file_name: &str, bytes: &[u8]) -> Result<DocumentKind, ExtractError> {
    let kind = DocumentKind::from_file_name(file_name).ok_or(ExtractError::UnsupportedFormat)?;
    if !bytes.starts_with(kind.magic()) {
        return Err(ExtractError::ContentMismatch {
            expected: kind.label(),
        });
    }
    Ok(kind)
}

/// Extracts text on the blocking pool; PDF decoding is CPU-bound.
pub async fn extract_text(kind: DocumentKind, bytes: Bytes) -> Result<String, ExtractError> {
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => extract_text_from_pdf(&bytes),
        DocumentKind::Docx => extract_text_from_docx(&bytes),
    })
    .await
    .map_err(|e| ExtractError::Malformed(format!("extraction task failed: {e}")))??;

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Malformed(e.to_string()))
}

pub fn extract_text_from_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Malformed(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractError::Malformed(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Malformed(e.to_string()))?;
    Ok(flatten_document_xml(&xml))
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

/// Turns WordprocessingML into plain text: one line per paragraph, tabs and
/// breaks preserved, markup dropped, entities decoded.
fn flatten_document_xml(xml: &str) -> String {
    static TAB: OnceLock<Regex> = OnceLock::new();
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    static ENTITY: OnceLock<Regex> = OnceLock::new();

    let text = regex(&TAB, r"<w:tab\s*/>").replace_all(xml, "\t");
    let text = regex(&BREAK, r"<w:(?:br|cr)\b[^>]*/>|</w:p>").replace_all(&text, "\n");
    let text = regex(&TAG, r"<[^>]+>").replace_all(&text, "");
    let text = regex(&ENTITY, r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);")
        .replace_all(&text, |caps: &Captures| decode_entity(&caps[1]));

    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

fn decode_entity(name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        return match name {
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "apos" => "'",
            _ => "&",
        }
        .to_string();
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::test_support::{docx_with_body, paragraph};
    use super::*;

    #[test]
    fn test_kind_from_file_name_is_case_insensitive() {
        assert_eq!(DocumentKind::from_file_name("cv.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_file_name("My CV.docx"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_file_name("cv.doc"), None);
        assert_eq!(DocumentKind::from_file_name("cv.pdf.exe"), None);
    }

    #[test]
    fn test_sniff_rejects_unknown_extension() {
        assert!(matches!(
            sniff("resume.txt", b"hello"),
            Err(ExtractError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_sniff_rejects_mismatched_content() {
        let err = sniff("resume.pdf", b"PK\x03\x04rest").unwrap_err();
        assert!(matches!(err, ExtractError::ContentMismatch { expected: "PDF" }));
    }

    #[test]
    fn test_sniff_accepts_matching_magic() {
        assert_eq!(
            sniff("resume.pdf", b"%PDF-1.7\n...").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            sniff("resume.docx", b"PK\x03\x04...").unwrap(),
            DocumentKind::Docx
        );
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let body = format!(
            "{}{}{}",
            paragraph("Layla Haddad"),
            paragraph("Experience"),
            paragraph("Data Engineer &amp; Analyst")
        );
        let text = extract_text_from_docx(&docx_with_body(&body)).unwrap();
        assert_eq!(text, "Layla Haddad\nExperience\nData Engineer & Analyst");
    }

    #[test]
    fn test_docx_without_document_xml_is_malformed() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            extract_text_from_docx(&bytes),
            Err(ExtractError::Malformed(_))
        ));
    }

    #[test]
    fn test_flatten_handles_tabs_breaks_and_entities() {
        let xml = "<w:p><w:r><w:t>Skills:</w:t><w:tab/><w:t>Rust</w:t><w:br/><w:t>&lt;SQL&gt; &#233;t&#xE9;</w:t></w:r></w:p>";
        assert_eq!(flatten_document_xml(xml), "Skills:\tRust\n<SQL> été");
    }

    #[test]
    fn test_flatten_collapses_blank_paragraph_runs() {
        let xml = "<w:p><w:t>A</w:t></w:p><w:p></w:p><w:p></w:p><w:p></w:p><w:p><w:t>B</w:t></w:p>";
        assert_eq!(flatten_document_xml(xml), "A\n\nB");
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_malformed() {
        let bytes = Bytes::from_static(b"%PDF-1.4 not really a pdf");
        assert!(matches!(
            extract_text(DocumentKind::Pdf, bytes).await,
            Err(ExtractError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_text_rejects_empty_documents() {
        let bytes = Bytes::from(docx_with_body("<w:p></w:p>"));
        assert!(matches!(
            extract_text(DocumentKind::Docx, bytes).await,
            Err(ExtractError::Empty)
        ));
    }
}
