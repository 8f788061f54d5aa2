//! Markdown rendering of extracted document elements.

use crate::types::DocumentElement;

/// Separator placed between rendered elements.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Deepest heading level rendered; deeper titles are clamped to it.
pub const MAX_HEADING_LEVEL: u32 = 9;

/// Render elements as a single Markdown string, one paragraph per element.
///
/// The output is flat: there is no list nesting, tables are emitted as their
/// text, and Markdown control characters in the source are not escaped.
pub fn render_markdown(elements: &[DocumentElement]) -> String {
    elements
        .iter()
        .map(render_element)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Render a single element.
pub fn render_element(element: &DocumentElement) -> String {
    match element {
        DocumentElement::Title { text, metadata } => {
            let level = metadata
                .category_depth
                .filter(|&d| d > 0)
                .unwrap_or(1)
                .min(MAX_HEADING_LEVEL);
            format!("{} {}", "#".repeat(level as usize), text)
        }
        DocumentElement::ListItem { text, .. } => format!("- {}", text),
        DocumentElement::Formula { text, .. } => format!("```\n{}\n```", text),
        other => other.content().unwrap_or_default().to_string(),
    }
}
