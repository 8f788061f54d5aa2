//! PDF file parser implementation.

use docmark_core::{DocumentElement, Error, FileType, Partition, ReadSeek, Result};
use regex::Regex;
use std::io::{Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex splitting extracted text into blocks at blank lines.
static BLOCK_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Regex matching a bulleted or enumerated line, capturing the item text.
static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[•●▪◦‣∙·■□➢\-\*–]|\(?\d{1,3}[.)])\s+(\S.*)$").unwrap()
});

/// Longest line, in words, still considered a possible title.
const MAX_TITLE_WORDS: usize = 12;

/// Characters that end sentences rather than headings.
const SENTENCE_ENDINGS: &[char] = &['.', ',', ';', '!', '?'];

/// Form feed, emitted between pages by the text extractor.
const PAGE_SEPARATOR: char = '\u{000C}';

/// Parser for PDF files.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PDF from a reader into elements in reading order.
    pub fn parse<R: Read + Seek>(&self, mut reader: R) -> Result<Vec<DocumentElement>> {
        reader.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let text = extract_text(&bytes)?;
        let elements = elements_from_text(&text);
        log::debug!("Extracted {} elements", elements.len());

        Ok(elements)
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Partition for PdfParser {
    fn file_type(&self) -> FileType {
        FileType::Pdf
    }

    fn partition(&self, reader: &mut dyn ReadSeek) -> Result<Vec<DocumentElement>> {
        self.parse(reader)
    }
}

/// Extract raw text, turning extractor panics on malformed input into errors.
fn extract_text(bytes: &[u8]) -> Result<String> {
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    match extracted {
        Ok(Ok(text)) => Ok(text.nfkc().collect()),
        Ok(Err(e)) => Err(Error::PdfParseError(format!("PDF extraction failed: {}", e))),
        Err(_) => Err(Error::PdfParseError(
            "PDF extraction failed: malformed document".to_string(),
        )),
    }
}

/// Segment extracted text into elements.
///
/// Page numbers are only attached when the text contains page separators.
pub fn elements_from_text(text: &str) -> Vec<DocumentElement> {
    let pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
    let paginated = pages.len() > 1;

    let mut elements = Vec::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_elements = elements_from_page(page);
        if paginated {
            let page_number = (idx + 1) as u32;
            elements.extend(page_elements.into_iter().map(|e| e.on_page(page_number)));
        } else {
            elements.extend(page_elements);
        }
    }

    elements
}

fn elements_from_page(page: &str) -> Vec<DocumentElement> {
    let normalized = page.replace("\r\n", "\n").replace('\r', "\n");
    let mut elements = Vec::new();

    for block in BLOCK_SPLIT_REGEX.split(&normalized) {
        let mut paragraph: Vec<&str> = Vec::new();

        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(caps) = BULLET_REGEX.captures(line) {
                flush_paragraph(&mut paragraph, &mut elements);
                if let Some(item) = caps.get(1) {
                    elements.push(DocumentElement::list_item(item.as_str().trim()));
                }
            } else {
                paragraph.push(line);
            }
        }

        flush_paragraph(&mut paragraph, &mut elements);
    }

    elements
}

fn flush_paragraph(paragraph: &mut Vec<&str>, elements: &mut Vec<DocumentElement>) {
    match paragraph.as_slice() {
        [] => return,
        [line] if is_possible_title(line) => elements.push(DocumentElement::title(*line)),
        lines => elements.push(DocumentElement::narrative_text(lines.join(" "))),
    }
    paragraph.clear();
}

/// A short line with letters and no sentence punctuation at the end.
fn is_possible_title(line: &str) -> bool {
    let words = line.split_whitespace().count();
    words > 0
        && words <= MAX_TITLE_WORDS
        && line.chars().any(char::is_alphabetic)
        && !line.ends_with(SENTENCE_ENDINGS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_title_paragraph_and_list() {
        let text = "Introduction\n\nThis document describes the system.\nIt spans two lines.\n\n• first item\n• second item\n1. numbered item";

        assert_eq!(
            elements_from_text(text),
            vec![
                DocumentElement::title("Introduction"),
                DocumentElement::narrative_text("This document describes the system. It spans two lines."),
                DocumentElement::list_item("first item"),
                DocumentElement::list_item("second item"),
                DocumentElement::list_item("numbered item"),
            ]
        );
    }

    #[test]
    fn test_sentence_is_not_title() {
        assert_eq!(
            elements_from_text("A short sentence."),
            vec![DocumentElement::narrative_text("A short sentence.")]
        );
    }

    #[test]
    fn test_page_numbers_alone_are_not_titles() {
        assert_eq!(
            elements_from_text("42"),
            vec![DocumentElement::narrative_text("42")]
        );
    }

    #[test]
    fn test_long_line_is_not_title() {
        let line = "one two three four five six seven eight nine ten eleven twelve thirteen";
        assert_eq!(
            elements_from_text(line),
            vec![DocumentElement::narrative_text(line)]
        );
    }

    #[test]
    fn test_list_inside_paragraph_block() {
        let text = "Requirements are:\n- fast\n- correct\nThat is all we need";

        assert_eq!(
            elements_from_text(text),
            vec![
                DocumentElement::title("Requirements are:"),
                DocumentElement::list_item("fast"),
                DocumentElement::list_item("correct"),
                DocumentElement::title("That is all we need"),
            ]
        );
    }

    #[test]
    fn test_pages() {
        let text = "First page text.\u{000C}Second page text.";

        assert_eq!(
            elements_from_text(text),
            vec![
                DocumentElement::narrative_text("First page text.").on_page(1),
                DocumentElement::narrative_text("Second page text.").on_page(2),
            ]
        );
    }

    #[test]
    fn test_blank_text() {
        assert!(elements_from_text("  \n\n \n").is_empty());
    }

    #[test]
    fn test_not_a_pdf() {
        let err = PdfParser::new()
            .parse(Cursor::new(b"this is not a pdf".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::PdfParseError(_)));
    }
}
