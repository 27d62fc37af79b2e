//! Text extraction for uploaded documents
//!
//! - `.pdf`: `pdf-extract`
//! - `.docx`: paragraph text from `word/document.xml` inside the zip container
//! - anything else: lossy UTF-8

use std::io::{Cursor, Read};
use std::sync::OnceLock;
use regex::Regex;
use crate::{Error, Result};

/// Upload formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    Text,
}

impl FileKind {
    /// Detect by file name, falling back to the PDF magic bytes
    pub fn detect(file_name: &str, head: &[u8]) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") || head.starts_with(b"%PDF-") {
            FileKind::Pdf
        } else if lower.ends_with(".docx") {
            FileKind::Docx
        } else {
            FileKind::Text
        }
    }
}

/// Extract plain text from an uploaded file's bytes.
///
/// The result is trimmed. Unreadable or corrupt content is an
/// [`Error::Extraction`].
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    let kind = FileKind::detect(file_name, bytes);
    tracing::debug!("Extracting {:?} text from '{}' ({} bytes)", kind, file_name, bytes.len());

    let text = match kind {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::Extraction(format!("Error reading file: {}", e)))?,
        FileKind::Docx => extract_docx(bytes)?,
        FileKind::Text => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(text.trim().to_string())
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::Extraction(format!("Error reading file: not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("Error reading file: missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::Extraction(format!("Error reading file: {}", e)))?;

    Ok(docx_paragraphs(&xml).join("\n"))
}

fn run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br/>").expect("valid run pattern")
    })
}

/// Paragraph texts of a WordprocessingML body, one entry per `<w:p>`
fn docx_paragraphs(xml: &str) -> Vec<String> {
    xml.split("</w:p>")
        .filter(|chunk| chunk.contains("<w:p"))
        .map(|chunk| {
            let mut paragraph = String::new();
            for caps in run_pattern().captures_iter(chunk) {
                match caps.get(1) {
                    Some(text) => paragraph.push_str(&unescape_xml(text.as_str())),
                    None if &caps[0] == "<w:tab/>" => paragraph.push('\t'),
                    None => paragraph.push('\n'),
                }
            }
            paragraph
        })
        .collect()
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("word/document.xml", options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(FileKind::detect("Lecture.PDF", b""), FileKind::Pdf);
        assert_eq!(FileKind::detect("upload", b"%PDF-1.7"), FileKind::Pdf);
        assert_eq!(FileKind::detect("notes.docx", b"PK"), FileKind::Docx);
        assert_eq!(FileKind::detect("notes.md", b"# hi"), FileKind::Text);
    }

    #[test]
    fn test_plain_text_is_trimmed_and_lossy() {
        let text = extract_text("notes.txt", b"  photosynthesis \xff \n").unwrap();
        assert!(text.starts_with("photosynthesis"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_docx_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Cell </w:t></w:r><w:r><w:t xml:space="preserve">Biology</w:t></w:r></w:p>
            <w:p><w:r><w:t>Mitosis &amp; Meiosis</w:t><w:tab/><w:t>p.4</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = extract_text("bio.docx", &docx_bytes(xml)).unwrap();
        assert_eq!(text, "Cell Biology\nMitosis & Meiosis\tp.4");
    }

    #[test]
    fn test_corrupt_docx_is_extraction_error() {
        let err = extract_text("broken.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
