//! PPTX file parser implementation.

use docmark_core::{DocumentElement, Error, FileType, Partition, ReadSeek, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader into elements, slide by slide.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Vec<DocumentElement>> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_order.len());

        let mut elements = Vec::new();
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide_number = (idx + 1) as u32;
            elements.extend(self.parse_slide(&mut archive, slide_path, slide_number)?);
        }

        Ok(elements)
    }

    /// Get the ordered list of slide paths.
    ///
    /// The order comes from the slide id list in presentation.xml. When that
    /// is missing, slides are ordered by the number in their relationship id
    /// or file name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels = parse_slide_relationships(&rels_content)?;

        let listed = match self.read_file_from_archive(archive, PRESENTATION_PATH) {
            Ok(content) => parse_slide_id_list(&content)?,
            Err(e) => {
                log::warn!("Falling back to relationship order: {}", e);
                Vec::new()
            }
        };

        if !listed.is_empty() {
            let by_id: HashMap<&str, &str> = slide_rels
                .iter()
                .map(|rel| (rel.id.as_str(), rel.path.as_str()))
                .collect();
            return Ok(listed
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).map(|path| path.to_string()))
                .collect());
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_iter()
            .map(|rel| {
                let order_num = extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.path));
                (rel.path, order_num)
            })
            .collect();

        slides.sort_by(|a, b| {
            match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            }
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide into elements.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: u32,
    ) -> Result<Vec<DocumentElement>> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut shapes = extract_shapes_from_xml(&content)?;

        // Top-to-bottom, then left-to-right
        shapes.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        let elements = shapes
            .into_iter()
            .flat_map(ShapeInfo::into_elements)
            .map(|element| element.on_page(slide_number))
            .collect();

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

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Partition for PptxParser {
    fn file_type(&self) -> FileType {
        FileType::Pptx
    }

    fn partition(&self, reader: &mut dyn ReadSeek) -> Result<Vec<DocumentElement>> {
        self.parse(reader)
    }
}

/// A slide relationship from presentation.xml.rels.
#[derive(Debug)]
struct SlideRelationship {
    id: String,
    path: String,
}

/// Collect the relationships that point at slides.
fn parse_slide_relationships(xml_content: &str) -> Result<Vec<SlideRelationship>> {
    let mut slides = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"Relationship" => {
                let rel_type = attribute(e, b"Type").unwrap_or_default();
                let target = attribute(e, b"Target").unwrap_or_default();
                let id = attribute(e, b"Id").unwrap_or_default();

                if rel_type.ends_with("/slide") {
                    let path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    slides.push(SlideRelationship { id, path });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of the slides listed in presentation.xml, in show order.
fn parse_slide_id_list(xml_content: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldId" => {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// A text paragraph inside a shape.
#[derive(Debug, Default)]
struct ParagraphInfo {
    text: String,
    level: u32,
    bulleted: bool,
}

impl ParagraphInfo {
    fn is_list_item(&self) -> bool {
        self.bulleted || self.level > 0
    }
}

/// Information about a shape extracted from XML.
#[derive(Debug, Default)]
struct ShapeInfo {
    paragraphs: Vec<ParagraphInfo>,
    table_rows: Vec<Vec<String>>,
    is_title: bool,
    x: f64,
    y: f64,
}

impl ShapeInfo {
    fn into_elements(self) -> Vec<DocumentElement> {
        if !self.table_rows.is_empty() {
            let text = self
                .table_rows
                .iter()
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join("\n");
            return vec![DocumentElement::table(text.trim())];
        }

        if self.is_title {
            let text = self
                .paragraphs
                .iter()
                .map(|p| p.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                return Vec::new();
            }
            return vec![DocumentElement::title(text)];
        }

        self.paragraphs
            .into_iter()
            .filter(|p| !p.text.trim().is_empty())
            .map(|p| {
                let text = p.text.trim();
                if p.is_list_item() {
                    DocumentElement::list_item(text)
                } else {
                    DocumentElement::text(text)
                }
            })
            .collect()
    }
}

/// Extract shapes with their paragraphs and position from slide XML.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<ShapeInfo>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut current_shape: Option<ShapeInfo> = None;
    let mut current_paragraph: Option<ParagraphInfo> = None;
    let mut current_row: Option<Vec<String>> = None;
    let mut current_cell: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" | b"graphicFrame" => {
                        current_shape = Some(ShapeInfo::default());
                    }
                    b"tr" if current_shape.is_some() => current_row = Some(Vec::new()),
                    b"tc" if current_row.is_some() => current_cell = Some(String::new()),
                    b"p" if current_shape.is_some() => {
                        current_paragraph = Some(ParagraphInfo::default());
                    }
                    b"t" if current_paragraph.is_some() => in_text = true,
                    other => apply_properties(other, e, &mut current_shape, &mut current_paragraph),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"br" => {
                        if let Some(ref mut paragraph) = current_paragraph {
                            paragraph.text.push('\n');
                        }
                    }
                    other => apply_properties(other, e, &mut current_shape, &mut current_paragraph),
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text {
                    if let Some(ref mut paragraph) = current_paragraph {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::XmlError(format!("Invalid text content: {}", err)))?;
                        paragraph.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"t" => in_text = false,
                    b"p" => {
                        if let Some(paragraph) = current_paragraph.take() {
                            if let Some(ref mut cell) = current_cell {
                                if !cell.is_empty() {
                                    cell.push(' ');
                                }
                                cell.push_str(paragraph.text.trim());
                            } else if let Some(ref mut shape) = current_shape {
                                shape.paragraphs.push(paragraph);
                            }
                        }
                    }
                    b"tc" => {
                        if let (Some(cell), Some(row)) = (current_cell.take(), current_row.as_mut()) {
                            row.push(cell);
                        }
                    }
                    b"tr" => {
                        if let (Some(row), Some(shape)) = (current_row.take(), current_shape.as_mut()) {
                            shape.table_rows.push(row);
                        }
                    }
                    b"sp" | b"graphicFrame" => {
                        if let Some(shape) = current_shape.take() {
                            shapes.push(shape);
                        }
                        current_paragraph = None;
                        in_text = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing slide at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Apply placeholder, position, and paragraph property elements to the
/// shape or paragraph being built.
fn apply_properties(
    local: &[u8],
    e: &BytesStart<'_>,
    current_shape: &mut Option<ShapeInfo>,
    current_paragraph: &mut Option<ParagraphInfo>,
) {
    match local {
        b"ph" => {
            if let Some(ref mut shape) = current_shape {
                let ph_type = attribute(e, b"type").unwrap_or_default();
                shape.is_title = matches!(ph_type.as_str(), "title" | "ctrTitle");
            }
        }
        b"off" => {
            if let Some(ref mut shape) = current_shape {
                if let Some(x) = attribute(e, b"x").and_then(|v| v.parse::<f64>().ok()) {
                    shape.x = x;
                }
                if let Some(y) = attribute(e, b"y").and_then(|v| v.parse::<f64>().ok()) {
                    shape.y = y;
                }
            }
        }
        b"pPr" => {
            if let Some(ref mut paragraph) = current_paragraph {
                if let Some(level) = attribute(e, b"lvl").and_then(|v| v.parse::<u32>().ok()) {
                    paragraph.level = level;
                }
            }
        }
        b"buChar" | b"buAutoNum" => {
            if let Some(ref mut paragraph) = current_paragraph {
                paragraph.bulleted = true;
            }
        }
        b"buNone" => {
            if let Some(ref mut paragraph) = current_paragraph {
                paragraph.bulleted = false;
            }
        }
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

/// The namespaced `r:id` attribute, as opposed to a plain `id`.
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id"
        })
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

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    const LAYOUT_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    fn build_pptx(slides: &[String], show_order: Option<&[&str]>) -> Vec<u8> {
        let mut rels = String::from(r#"<?xml version="1.0"?><Relationships>"#);
        rels.push_str(&format!(
            r#"<Relationship Id="rId100" Type="{}" Target="slideMasters/slideMaster1.xml"/>"#,
            LAYOUT_REL
        ));
        for (idx, _) in slides.iter().enumerate() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="{}" Target="slides/slide{n}.xml"/>"#,
                SLIDE_REL,
                n = idx + 1
            ));
        }
        rels.push_str("</Relationships>");

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(PRESENTATION_RELS_PATH, FileOptions::default()).unwrap();
        writer.write_all(rels.as_bytes()).unwrap();

        if let Some(order) = show_order {
            let ids: String = order
                .iter()
                .enumerate()
                .map(|(i, rid)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid))
                .collect();
            let presentation = format!(
                r#"<?xml version="1.0"?><p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
                ids
            );
            writer.start_file(PRESENTATION_PATH, FileOptions::default()).unwrap();
            writer.write_all(presentation.as_bytes()).unwrap();
        }

        for (idx, slide) in slides.iter().enumerate() {
            writer
                .start_file(format!("ppt/slides/slide{}.xml", idx + 1), FileOptions::default())
                .unwrap();
            writer.write_all(slide.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    fn shape(ph: Option<&str>, y: u64, paragraphs: &str) -> String {
        let ph = ph
            .map(|t| format!(r#"<p:nvSpPr><p:nvPr><p:ph type="{}"/></p:nvPr></p:nvSpPr>"#, t))
            .unwrap_or_default();
        format!(
            r#"<p:sp>{}<p:spPr><a:xfrm><a:off x="0" y="{}"/></a:xfrm></p:spPr><p:txBody>{}</p:txBody></p:sp>"#,
            ph, y, paragraphs
        )
    }

    fn slide(shapes: &[String]) -> String {
        format!(
            r#"<?xml version="1.0"?><p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            shapes.concat()
        )
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_title_bullets_and_text() {
        let body = shape(
            None,
            2000,
            concat!(
                r#"<a:p><a:pPr><a:buChar char="•"/></a:pPr><a:r><a:t>First point</a:t></a:r></a:p>"#,
                r#"<a:p><a:pPr lvl="1"/><a:r><a:t>Nested point</a:t></a:r></a:p>"#,
                r#"<a:p><a:r><a:t>Plain </a:t></a:r><a:r><a:t>sentence</a:t></a:r></a:p>"#,
            ),
        );
        let title = shape(Some("title"), 100, r#"<a:p><a:r><a:t>Quarterly Review</a:t></a:r></a:p>"#);
        // Body is listed first in the XML but sits below the title.
        let pptx = build_pptx(&[slide(&[body, title])], None);

        let elements = PptxParser::new().parse(Cursor::new(pptx)).unwrap();

        assert_eq!(
            elements,
            vec![
                DocumentElement::title("Quarterly Review").on_page(1),
                DocumentElement::list_item("First point").on_page(1),
                DocumentElement::list_item("Nested point").on_page(1),
                DocumentElement::text("Plain sentence").on_page(1),
            ]
        );
    }

    #[test]
    fn test_slide_order_follows_presentation() {
        let first = slide(&[shape(None, 0, r#"<a:p><a:r><a:t>one</a:t></a:r></a:p>"#)]);
        let second = slide(&[shape(None, 0, r#"<a:p><a:r><a:t>two</a:t></a:r></a:p>"#)]);
        let pptx = build_pptx(&[first, second], Some(&["rId2", "rId1"]));

        let elements = PptxParser::new().parse(Cursor::new(pptx)).unwrap();

        assert_eq!(
            elements,
            vec![
                DocumentElement::text("two").on_page(1),
                DocumentElement::text("one").on_page(2),
            ]
        );
    }

    #[test]
    fn test_table_shape() {
        let table = concat!(
            r#"<p:graphicFrame><p:xfrm><a:off x="0" y="0"/></p:xfrm><a:graphic><a:graphicData><a:tbl>"#,
            r#"<a:tr><a:tc><a:txBody><a:p><a:r><a:t>Name</a:t></a:r></a:p></a:txBody></a:tc>"#,
            r#"<a:tc><a:txBody><a:p><a:r><a:t>Qty</a:t></a:r></a:p></a:txBody></a:tc></a:tr>"#,
            r#"<a:tr><a:tc><a:txBody><a:p><a:r><a:t>Apples</a:t></a:r></a:p></a:txBody></a:tc>"#,
            r#"<a:tc><a:txBody><a:p><a:r><a:t>3</a:t></a:r></a:p></a:txBody></a:tc></a:tr>"#,
            r#"</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        let pptx = build_pptx(&[slide(&[table.to_string()])], None);

        let elements = PptxParser::new().parse(Cursor::new(pptx)).unwrap();

        assert_eq!(elements, vec![DocumentElement::table("Name Qty\nApples 3").on_page(1)]);
    }

    #[test]
    fn test_empty_shapes_skipped() {
        let empty = shape(Some("title"), 0, r#"<a:p><a:r><a:t>   </a:t></a:r></a:p>"#);
        let pptx = build_pptx(&[slide(&[empty])], None);

        let elements = PptxParser::new().parse(Cursor::new(pptx)).unwrap();
        assert!(elements.is_empty());
    }

    #[test]
    fn test_malformed_slide_is_an_error() {
        let broken = shape(
            None,
            0,
            r#"<a:p><a:r><a:t>kept</a:t></a:r></a:p><a:p><a:r><a:t>lost</a:r></a:p>"#,
        );
        let pptx = build_pptx(&[slide(&[broken])], None);

        let err = PptxParser::new().parse(Cursor::new(pptx)).unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let body = shape(None, 0, r#"<a:p><a:r><a:t>fish &chips; peas</a:t></a:r></a:p>"#);
        let pptx = build_pptx(&[slide(&[body])], None);

        let err = PptxParser::new().parse(Cursor::new(pptx)).unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = PptxParser::new()
            .parse(Cursor::new(b"definitely not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_partition_trait() {
        let pptx = build_pptx(&[slide(&[shape(None, 0, r#"<a:p><a:r><a:t>hi</a:t></a:r></a:p>"#)])], None);
        let parser = PptxParser::new();
        let mut cursor = Cursor::new(pptx);

        assert_eq!(parser.file_type(), FileType::Pptx);
        assert_eq!(
            parser.partition(&mut cursor).unwrap(),
            vec![DocumentElement::text("hi").on_page(1)]
        );
    }
}
