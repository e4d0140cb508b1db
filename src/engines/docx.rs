//! Plain-text extraction from `.docx` files.
//!
//! A DOCX file is a zip archive; the body text lives in `word/document.xml`.
//! The XML is parsed with `roxmltree` and walked in document order: `<w:t>`
//! runs give text, `<w:tab/>` a tab, `<w:br/>` and `<w:cr/>` a newline.
//! Every `<w:p>` (including empty, self-closing ones) starts a new line.

use roxmltree::{Document, Node};
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_XML: &str = "word/document.xml";

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Read the body text of the DOCX at `path`.
pub fn read_docx_text(path: &Path) -> Result<String, String> {
    let file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    read_docx(file)
}

/// Read the body text of a DOCX archive from any seekable reader.
pub fn read_docx<R: Read + Seek>(reader: R) -> Result<String, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("not a DOCX archive: {e}"))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| format!("missing {DOCUMENT_XML}: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;
    document_xml_text(&xml)
}

/// Extract paragraph text from WordprocessingML.
pub fn document_xml_text(xml: &str) -> Result<String, String> {
    let doc = Document::parse(xml).map_err(|e| format!("malformed {DOCUMENT_XML}: {e}"))?;

    let mut paragraphs: Vec<String> = Vec::new();
    for node in doc.descendants().filter(is_word_element) {
        match node.tag_name().name() {
            "p" => paragraphs.push(String::new()),
            "t" => current(&mut paragraphs).push_str(node.text().unwrap_or("")),
            "tab" if in_run(&node) => current(&mut paragraphs).push('\t'),
            "br" | "cr" => current(&mut paragraphs).push('\n'),
            _ => {}
        }
    }
    Ok(paragraphs.join("\n"))
}

fn is_word_element(node: &Node) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(W_NS)
}

/// `<w:tab>` also appears in paragraph tab-stop definitions (`<w:tabs>`).
fn in_run(node: &Node) -> bool {
    node.parent_element()
        .is_some_and(|p| p.tag_name().name() == "r")
}

fn current(paragraphs: &mut Vec<String>) -> &mut String {
    if paragraphs.is_empty() {
        paragraphs.push(String::new());
    }
    let last = paragraphs.len() - 1;
    &mut paragraphs[last]
}
