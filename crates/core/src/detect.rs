//! File type detection.
//!
//! Detection looks at three sources in order of trust: a declared MIME type,
//! the file name, and finally the file content. The first source that yields
//! a known type wins, so a declared MIME type is taken at its word even when
//! the content disagrees.

use crate::types::FileType;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF_MAGIC: &[u8] = b"GIF8";
const TIFF_LE_MAGIC: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
const TIFF_BE_MAGIC: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];
const RTF_MAGIC: &[u8] = b"{\\rtf";

/// Resolve the type of a file.
///
/// `mime_type` is only trusted when it is a MIME type we know. `name` may be
/// a bare file name or a full URI; only its extension is used. `content`
/// should hold the complete file when OOXML documents need to be told apart,
/// a shorter prefix is enough for everything else.
pub fn detect_file_type(
    mime_type: Option<&str>,
    name: Option<&str>,
    content: Option<&[u8]>,
) -> FileType {
    if let Some(file_type) = mime_type.and_then(from_mime_type) {
        log::debug!("Detected {} from MIME type", file_type);
        return file_type;
    }

    if let Some(file_type) = name.and_then(from_name) {
        log::debug!("Detected {} from file name", file_type);
        return file_type;
    }

    match content {
        Some(bytes) => {
            let file_type = from_content(bytes);
            log::debug!("Detected {} from file content", file_type);
            file_type
        }
        None => FileType::Unknown,
    }
}

/// Look up a MIME type. Parameters such as `; charset=utf-8` are ignored.
pub fn from_mime_type(mime_type: &str) -> Option<FileType> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let file_type = match essence.as_str() {
        "text/markdown" | "text/x-markdown" => FileType::Markdown,
        "application/pdf" => FileType::Pdf,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            FileType::Docx
        }
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
            FileType::Pptx
        }
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => FileType::Xlsx,
        "application/msword" => FileType::Doc,
        "application/vnd.ms-powerpoint" => FileType::Ppt,
        "application/vnd.ms-excel" => FileType::Xls,
        "application/x-ole-storage" => FileType::Ole,
        "text/plain" => FileType::Txt,
        "text/csv" => FileType::Csv,
        "text/tab-separated-values" => FileType::Tsv,
        "text/html" => FileType::Html,
        "text/xml" | "application/xml" => FileType::Xml,
        "application/json" => FileType::Json,
        "text/rtf" | "application/rtf" => FileType::Rtf,
        "application/epub" | "application/epub+zip" => FileType::Epub,
        "application/vnd.oasis.opendocument.text" => FileType::Odt,
        "message/rfc822" => FileType::Eml,
        "application/vnd.ms-outlook" => FileType::Msg,
        "image/png" => FileType::Png,
        "image/jpeg" => FileType::Jpeg,
        "image/gif" => FileType::Gif,
        "image/tiff" => FileType::Tiff,
        "application/zip" => FileType::Zip,
        _ => return None,
    };

    Some(file_type)
}

/// Detect a file type from the extension of a file name or URI.
pub fn from_name(name: &str) -> Option<FileType> {
    let ext = Path::new(name).extension()?.to_str()?;
    from_extension(ext)
}

/// Detect a file type from a file extension (without the leading dot).
pub fn from_extension(ext: &str) -> Option<FileType> {
    let file_type = match ext.to_lowercase().as_str() {
        "md" | "markdown" => FileType::Markdown,
        "pdf" => FileType::Pdf,
        "docx" => FileType::Docx,
        "pptx" => FileType::Pptx,
        "xlsx" => FileType::Xlsx,
        "doc" => FileType::Doc,
        "ppt" => FileType::Ppt,
        "xls" => FileType::Xls,
        "txt" | "text" | "log" => FileType::Txt,
        "csv" => FileType::Csv,
        "tsv" => FileType::Tsv,
        "html" | "htm" => FileType::Html,
        "xml" => FileType::Xml,
        "json" => FileType::Json,
        "rtf" => FileType::Rtf,
        "epub" => FileType::Epub,
        "odt" => FileType::Odt,
        "eml" => FileType::Eml,
        "msg" => FileType::Msg,
        "png" => FileType::Png,
        "jpg" | "jpeg" => FileType::Jpeg,
        "gif" => FileType::Gif,
        "tif" | "tiff" => FileType::Tiff,
        "zip" => FileType::Zip,
        _ => return None,
    };

    Some(file_type)
}

/// Detect a file type from its content.
pub fn from_content(bytes: &[u8]) -> FileType {
    if bytes.starts_with(PDF_MAGIC) {
        return FileType::Pdf;
    }

    if bytes.starts_with(ZIP_MAGIC) {
        return sniff_zip(bytes);
    }

    if bytes.starts_with(OLE_MAGIC) {
        return FileType::Ole;
    }

    if bytes.starts_with(PNG_MAGIC) {
        return FileType::Png;
    }

    if bytes.starts_with(JPEG_MAGIC) {
        return FileType::Jpeg;
    }

    if bytes.starts_with(GIF_MAGIC) {
        return FileType::Gif;
    }

    if bytes.starts_with(TIFF_LE_MAGIC) || bytes.starts_with(TIFF_BE_MAGIC) {
        return FileType::Tiff;
    }

    if bytes.starts_with(RTF_MAGIC) {
        return FileType::Rtf;
    }

    if !bytes.is_empty() && !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok() {
        return FileType::Txt;
    }

    FileType::Unknown
}

/// Tell OOXML and other ZIP-based formats apart by their entry names.
fn sniff_zip(bytes: &[u8]) -> FileType {
    let archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(e) => {
            log::debug!("ZIP signature present but archive unreadable: {}", e);
            return FileType::Zip;
        }
    };

    let mut file_type = FileType::Zip;
    for name in archive.file_names() {
        match name {
            "word/document.xml" => return FileType::Docx,
            "ppt/presentation.xml" => return FileType::Pptx,
            "xl/workbook.xml" => return FileType::Xlsx,
            "META-INF/container.xml" => file_type = FileType::Epub,
            _ => {}
        }
    }

    file_type
}
