//! WordprocessingML (`.docx`) output.
//!
//! The package is the minimal set of parts Word needs: content types, the
//! package relationships, the main document and a style sheet with the two
//! heading styles. Each lesson's text sits in a one-column section and its
//! word list in a continuous two-column section, one column break per page.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::RenderConfig;
use crate::Result;
use crate::article::ArticleTextCollection;
use crate::layout::Page;

/// Renders lessons into the bytes of a `.docx` package.
pub fn render_docx(collections: &[ArticleTextCollection], config: &RenderConfig) -> Result<Vec<u8>> {
    let mut sections: Vec<Section> = Vec::new();

    for collection in collections {
        let text = article_text(collection, config);
        match sections.last_mut() {
            // A lesson without vocabulary leaves its text section open.
            Some(last) if last.layout == Layout::Text => {
                last.body.push_str(PAGE_BREAK);
                last.body.push_str(&text);
            }
            _ => sections.push(Section { layout: Layout::Text, body: text }),
        }

        let pages = collection.pages(config.column_capacity)?;
        if !pages.is_empty() {
            sections.push(Section { layout: Layout::Vocabulary, body: vocabulary(&pages, config.word_font_pt) });
        }
    }

    package(&document_xml(&sections))
}

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;
const COLUMN_BREAK: &str = r#"<w:p><w:r><w:br w:type="column"/></w:r></w:p>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Headings and main text, one column, starting on a new page.
    Text,
    /// Word list: continuous, two columns, 72pt side margins, 36pt between columns.
    Vocabulary,
}

struct Section {
    layout: Layout,
    body: String,
}

fn article_text(collection: &ArticleTextCollection, config: &RenderConfig) -> String {
    let mut body = String::new();

    body.push_str(&paragraph(&collection.metadata.chinese_title, Some("Heading1"), None));
    body.push_str(&paragraph(&collection.subtitle(), Some("Heading2"), None));
    for line in &collection.main_text {
        body.push_str(&paragraph(line, None, Some(config.body_font_pt)));
    }

    body
}

/// Column 1 entries, a column break, then column 2; pages are separated by page breaks.
fn vocabulary(pages: &[Page], size_pt: u32) -> String {
    let mut body = String::new();

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            body.push_str(PAGE_BREAK);
        }
        for entry in &page.column1 {
            body.push_str(&paragraph(entry, None, Some(size_pt)));
        }
        if !page.column2.is_empty() {
            body.push_str(COLUMN_BREAK);
            for entry in &page.column2 {
                body.push_str(&paragraph(entry, None, Some(size_pt)));
            }
        }
    }

    body
}

/// One paragraph with an optional style and font size in points.
fn paragraph(text: &str, style: Option<&str>, size_pt: Option<u32>) -> String {
    let properties = style
        .map(|style| format!(r#"<w:pPr><w:pStyle w:val="{style}"/></w:pPr>"#))
        .unwrap_or_default();
    let run_properties = size_pt
        .map(|pt| format!(r#"<w:rPr><w:sz w:val="{half}"/><w:szCs w:val="{half}"/></w:rPr>"#, half = pt * 2))
        .unwrap_or_default();

    format!(
        r#"<w:p>{properties}<w:r>{run_properties}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        xml_escape_text(text)
    )
}

/// Section properties, in twentieths of a point.
fn section_properties(layout: Layout) -> String {
    let (start, columns) = match layout {
        Layout::Text => ("nextPage", r#"<w:cols w:space="720"/>"#),
        Layout::Vocabulary => ("continuous", r#"<w:cols w:num="2" w:space="720"/>"#),
    };

    format!(
        concat!(
            r#"<w:sectPr><w:type w:val="{start}"/><w:pgSz w:w="12240" w:h="15840"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
            r#"{columns}</w:sectPr>"#,
        ),
        start = start,
        columns = columns,
    )
}

fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Every section but the last is closed by a paragraph carrying its
/// properties; the last one's go at the end of the body.
fn document_xml(sections: &[Section]) -> String {
    let mut body = String::new();

    for (i, section) in sections.iter().enumerate() {
        body.push_str(&section.body);
        if i + 1 == sections.len() {
            break;
        }
        let properties = section_properties(section.layout);
        match section.layout {
            // The word list starts on a fresh page.
            Layout::Text => body.push_str(&format!(r#"<w:p><w:pPr>{properties}</w:pPr><w:r><w:br w:type="page"/></w:r></w:p>"#)),
            Layout::Vocabulary => body.push_str(&format!("<w:p><w:pPr>{properties}</w:pPr></w:p>")),
        }
    }

    let last = sections.last().map_or(Layout::Text, |section| section.layout);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
 xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    {body}
    {properties}
  </w:body>
</w:document>"#,
        properties = section_properties(last)
    )
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:qFormat/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="36"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="120" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
</w:styles>"#;

fn package(document_xml: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", RELS_XML),
        ("word/document.xml", document_xml),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/styles.xml", STYLES_XML),
    ];
    for (name, contents) in parts {
        zip.start_file(name, opt)?;
        zip.write_all(contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
