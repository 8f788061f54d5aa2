//! DOCX file parser implementation.
//!
//! Walks `word/document.xml` and turns each body paragraph into one element,
//! classified by its paragraph style and numbering. Style ids are resolved to
//! style names through `word/styles.xml` when the archive has one, so custom
//! style ids such as `berschrift1` still map to their "heading 1" name.

use docmark_core::{DocumentElement, Error, FileType, Partition, ReadSeek, Result, MAX_HEADING_LEVEL};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::sync::LazyLock;
use zip::ZipArchive;

const DOCUMENT_PATH: &str = "word/document.xml";
const STYLES_PATH: &str = "word/styles.xml";

/// Regex matching heading style names and ids, capturing the level.
static HEADING_STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^heading\s*(\d+)$").unwrap());

/// Parser for DOCX (Office Open XML) files.
pub struct DocxParser;

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOCX file from a reader into elements in document order.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<DocumentElement>> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let styles = match self.read_file_from_archive(&mut archive, STYLES_PATH) {
            Ok(content) => parse_style_names(&content)?,
            Err(e) => {
                log::debug!("No style definitions, using style ids: {}", e);
                HashMap::new()
            }
        };

        let document = self.read_file_from_archive(&mut archive, DOCUMENT_PATH)?;
        let elements = extract_elements(&document, &styles)?;
        log::debug!("Extracted {} elements", elements.len());

        Ok(elements)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Partition for DocxParser {
    fn file_type(&self) -> FileType {
        FileType::Docx
    }

    fn partition(&self, reader: &mut dyn ReadSeek) -> Result<Vec<DocumentElement>> {
        self.parse(reader)
    }
}

/// Map paragraph style ids to their display names.
fn parse_style_names(xml_content: &str) -> Result<HashMap<String, String>> {
    let mut names = HashMap::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"style" => {
                current_id = attribute(e, b"styleId");
            }
            Ok(Event::Empty(ref e)) if local_name(e.name().as_ref()) == b"name" => {
                if let (Some(id), Some(name)) = (current_id.as_ref(), attribute(e, b"val")) {
                    names.insert(id.clone(), name);
                }
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"style" => {
                current_id = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing styles: {}", e)));
            }
            _ => {}
        }
    }

    Ok(names)
}

/// A body paragraph being collected.
#[derive(Debug, Default)]
struct ParagraphState {
    text: String,
    style: Option<String>,
    numbered: bool,
    math: String,
    formulas: Vec<String>,
    page_breaks: usize,
}

impl ParagraphState {
    /// Turn the paragraph into elements: its text (if any), then its
    /// formulas, then any page breaks it contained.
    fn into_elements(self, styles: &HashMap<String, String>) -> Vec<DocumentElement> {
        let mut elements = Vec::new();
        let text = self.text.trim();

        if !text.is_empty() {
            let style_name = self
                .style
                .as_deref()
                .map(|id| styles.get(id).map(String::as_str).unwrap_or(id));
            elements.push(classify_paragraph(text, style_name, self.numbered));
        }

        elements.extend(self.formulas.into_iter().map(DocumentElement::formula));
        elements.extend((0..self.page_breaks).map(|_| DocumentElement::page_break()));
        elements
    }

    /// Plain text of the paragraph, used inside table cells.
    fn flat_text(&self) -> String {
        let mut parts = vec![self.text.trim().to_string()];
        parts.extend(self.formulas.iter().cloned());
        parts.retain(|p| !p.is_empty());
        parts.join(" ")
    }
}

/// Classify a non-empty paragraph by style name and numbering.
fn classify_paragraph(text: &str, style_name: Option<&str>, numbered: bool) -> DocumentElement {
    let style_name = style_name.map(str::trim).unwrap_or_default();

    if style_name.eq_ignore_ascii_case("title") {
        return DocumentElement::title(text);
    }

    if let Some(caps) = HEADING_STYLE_REGEX.captures(style_name) {
        match caps[1].parse::<u32>() {
            Ok(level) if (1..=MAX_HEADING_LEVEL).contains(&level) => {
                return DocumentElement::title_with_depth(text, level);
            }
            _ => log::debug!("Ignoring heading style out of range: {}", style_name),
        }
    }

    if numbered || style_name.to_lowercase().starts_with("list") {
        return DocumentElement::list_item(text);
    }

    DocumentElement::narrative_text(text)
}

/// A top-level table being collected.
#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

impl TableState {
    fn into_element(self) -> Option<DocumentElement> {
        let text = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|row| !row.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            None
        } else {
            Some(DocumentElement::table(text))
        }
    }
}

/// Extract elements from the main document part.
fn extract_elements(xml_content: &str, styles: &HashMap<String, String>) -> Result<Vec<DocumentElement>> {
    let mut elements = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut paragraph: Option<ParagraphState> = None;
    // Text boxes nest paragraphs inside paragraphs; only the outermost one
    // produces an element.
    let mut paragraph_depth = 0usize;
    let mut table: Option<TableState> = None;
    let mut table_depth = 0usize;
    let mut math_depth = 0usize;
    // Alternate content repeats its choice in a fallback; only the choice is read.
    let mut fallback_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"Fallback" => {
                fallback_depth += 1;
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"Fallback" => {
                fallback_depth = fallback_depth.saturating_sub(1);
            }
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Text(_)) | Ok(Event::End(_))
                if fallback_depth > 0 => {}
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" => {
                        paragraph_depth += 1;
                        if paragraph_depth == 1 {
                            paragraph = Some(ParagraphState::default());
                        }
                    }
                    b"tbl" => {
                        table_depth += 1;
                        if table_depth == 1 {
                            table = Some(TableState::default());
                        }
                    }
                    b"tr" if table_depth == 1 => {
                        if let Some(ref mut t) = table {
                            t.row.clear();
                        }
                    }
                    b"tc" if table_depth == 1 => {
                        if let Some(ref mut t) = table {
                            t.cell.clear();
                        }
                    }
                    b"oMath" => math_depth += 1,
                    b"t" => in_text = true,
                    other => apply_properties(other, e, &mut paragraph),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    // Tab stops in paragraph properties carry a w:val, run tabs do not
                    b"tab" if math_depth == 0 && attribute(e, b"val").is_none() => {
                        if let Some(ref mut p) = paragraph {
                            p.text.push('\t');
                        }
                    }
                    b"br" => {
                        if let Some(ref mut p) = paragraph {
                            if attribute(e, b"type").as_deref() == Some("page") {
                                p.page_breaks += 1;
                            } else {
                                p.text.push('\n');
                            }
                        }
                    }
                    other => apply_properties(other, e, &mut paragraph),
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(ref mut p) = paragraph {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::XmlError(format!("Invalid text content: {}", err)))?;
                        if math_depth > 0 {
                            p.math.push_str(&text);
                        } else {
                            p.text.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"t" => in_text = false,
                    b"oMath" => {
                        math_depth = math_depth.saturating_sub(1);
                        if math_depth == 0 {
                            if let Some(ref mut p) = paragraph {
                                let formula = std::mem::take(&mut p.math);
                                if !formula.trim().is_empty() {
                                    p.formulas.push(formula.trim().to_string());
                                }
                            }
                        }
                    }
                    b"p" => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            if let Some(p) = paragraph.take() {
                                match table {
                                    Some(ref mut t) => {
                                        if !t.cell.is_empty() {
                                            t.cell.push(' ');
                                        }
                                        t.cell.push_str(&p.flat_text());
                                    }
                                    None => elements.extend(p.into_elements(styles)),
                                }
                            }
                        }
                    }
                    b"tc" if table_depth == 1 => {
                        if let Some(ref mut t) = table {
                            let cell = std::mem::take(&mut t.cell);
                            t.row.push(cell);
                        }
                    }
                    b"tr" if table_depth == 1 => {
                        if let Some(ref mut t) = table {
                            let row = std::mem::take(&mut t.row);
                            t.rows.push(row);
                        }
                    }
                    b"tbl" => {
                        table_depth = table_depth.saturating_sub(1);
                        if table_depth == 0 {
                            if let Some(element) = table.take().and_then(TableState::into_element) {
                                elements.push(element);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing document at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(elements)
}

/// Apply paragraph property elements to the paragraph being built.
fn apply_properties(local: &[u8], e: &BytesStart<'_>, paragraph: &mut Option<ParagraphState>) {
    let Some(p) = paragraph else {
        return;
    };

    match local {
        b"pStyle" => p.style = attribute(e, b"val"),
        b"numPr" => p.numbered = true,
        // numId 0 removes numbering inherited from the style
        b"numId" if attribute(e, b"val").as_deref() == Some("0") => p.numbered = false,
        _ => {}
    }
}

/// Value of an attribute by its local name.
fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
