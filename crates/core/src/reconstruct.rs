//! Sentence reconstruction from annotated paragraph markup.
//!
//! Lesson paragraphs wrap every vocabulary word in an `<abbr>` carrying the
//! tooltip, with the simplified form, the traditional form and the ruby
//! pronunciation as children. Punctuation sits between the annotations as
//! bare text, and the last characters of a paragraph usually follow the last
//! annotation. The plain sentence is rebuilt by collecting three kinds of
//! fragments from the serialized markup, each tagged with its byte offset,
//! and sorting them once by that offset.
//!
//! # Example
//!
//! ```rust
//! use beanpress_core::reconstruct::reconstruct;
//!
//! let markup = concat!(
//!     r#"<p><abbr rel="tooltip"><span class="tr">你</span></abbr>,"#,
//!     r#"<abbr rel="tooltip"><span class="tr">好</span></abbr>.</p>"#,
//! );
//! assert_eq!(reconstruct(markup), "你,好.");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::parse::Document;

const ANNOTATION_CLOSE: &str = "</abbr>";
const PARAGRAPH_CLOSE: &str = "</p>";

/// A single non-word character squeezed between two annotations, possibly
/// written as one of the entities the serializer emits.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</abbr>(&nbsp;|&amp;|&lt;|&gt;|\W)<abbr").unwrap());

/// The traditional-character span inside an annotation.
static TRADITIONAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<span class="tr">([^<]*)</span>"#).unwrap());

static PARAGRAPH_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<p\b[^>]*>").unwrap());

/// Simplified and pronunciation spans, which never belong to the sentence text.
static READING_AIDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="si">[^<]*</span>|<rt>[^<]*</rt>|<rp>[^<]*</rp>"#).unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Where a fragment was found in the paragraph markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Punctuation between the close of one annotation and the start of the next.
    Punctuation,
    /// Traditional-character text of an annotated word.
    Word,
    /// Text after the last annotation, up to the end of the paragraph.
    Tail,
}

/// A piece of the reconstructed sentence and its byte offset in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub offset: usize,
    pub text: String,
    pub kind: FragmentKind,
}

/// Collects every fragment of a paragraph, sorted by offset.
///
/// Words and punctuation are only taken up to the close of the last
/// annotation and the tail only after it, so no text is claimed twice.
pub fn paragraph_fragments(markup: &str) -> Vec<Fragment> {
    let annotated_end = markup.rfind(ANNOTATION_CLOSE).map(|idx| idx + ANNOTATION_CLOSE.len());

    let mut fragments: Vec<Fragment> = PUNCTUATION
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| Fragment { offset: m.start(), text: decode_entities(m.as_str()), kind: FragmentKind::Punctuation })
        .collect();

    fragments.extend(
        TRADITIONAL
            .captures_iter(markup)
            .filter_map(|caps| caps.get(1))
            .filter(|m| !m.as_str().is_empty())
            .filter(|m| annotated_end.is_some_and(|end| m.end() < end))
            .map(|m| Fragment { offset: m.start(), text: decode_entities(m.as_str()), kind: FragmentKind::Word }),
    );

    fragments.extend(tail_fragment(markup, annotated_end));

    fragments.sort_by_key(|fragment| fragment.offset);
    fragments
}

/// Rebuilds the plain sentence of one paragraph in reading order.
///
/// An annotation without a traditional span contributes nothing; the rest of
/// the paragraph is still reconstructed.
pub fn reconstruct(markup: &str) -> String {
    paragraph_fragments(markup).into_iter().map(|fragment| fragment.text).collect()
}

/// Reconstructs every `<p>` of a document, dropping empty paragraphs.
pub fn reconstruct_main_text(doc: &Document) -> Result<Vec<String>> {
    Ok(doc
        .select("p")?
        .iter()
        .map(|p| reconstruct(&p.outer_html()))
        .filter(|sentence| !sentence.is_empty())
        .collect())
}

fn tail_fragment(markup: &str, annotated_end: Option<usize>) -> Option<Fragment> {
    let start = annotated_end.unwrap_or_else(|| PARAGRAPH_OPEN.find(markup).map(|m| m.end()).unwrap_or(0));
    let end = markup
        .rfind(PARAGRAPH_CLOSE)
        .filter(|&end| end >= start)
        .unwrap_or(markup.len());

    let without_aids = READING_AIDS.replace_all(&markup[start..end], "");
    let text = decode_entities(&TAG.replace_all(&without_aids, ""));
    if text.trim().is_empty() {
        return None;
    }

    Some(Fragment { offset: start, text, kind: FragmentKind::Tail })
}

/// Decodes the entities the HTML serializer emits inside text nodes.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
