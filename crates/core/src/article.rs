//! Extracted lesson text and vocabulary.
//!
//! This module defines [`ArticleTextCollection`], the unit that is cached,
//! laid out and rendered, and [`extract_article`], which builds one from a
//! fetched lesson page.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::canonical::{WordSet, canonicalize};
use crate::layout::{Page, flow};
use crate::metadata::ArticleMetadata;
use crate::parse::Document;
use crate::reconstruct::reconstruct_main_text;
use crate::vocabulary::{AnnotatedWord, extract_vocabulary};

/// Main text and vocabulary of one lesson, alongside its listing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleTextCollection {
    #[serde(flatten)]
    pub metadata: ArticleMetadata,

    /// Reconstructed paragraphs, empty ones already dropped.
    pub main_text: Vec<String>,

    /// Words at or above the minimum level, in page order, not deduplicated.
    pub vocabulary: Vec<AnnotatedWord>,
}

impl ArticleTextCollection {
    /// The main text with paragraphs joined by newlines.
    pub fn main_text_joined(&self) -> String {
        self.main_text.join("\n")
    }

    /// The canonical, deduplicated vocabulary.
    pub fn word_set(&self) -> WordSet {
        canonicalize(&self.vocabulary)
    }

    /// Vocabulary laid out in two-column pages.
    pub fn pages(&self, capacity: usize) -> Result<Vec<Page>> {
        flow(self.word_set(), capacity)
    }

    /// Secondary heading: `"<title> - (<category> - <difficulty>)"`.
    pub fn subtitle(&self) -> String {
        format!(
            "{} - ({} - {})",
            self.metadata.title, self.metadata.category_tag, self.metadata.difficulty_tag
        )
    }
}

/// Builds the text collection of one lesson page.
///
/// Extraction is pure: the same markup always produces the same collection.
pub fn extract_article(metadata: ArticleMetadata, html: &str, min_level: u32) -> Result<ArticleTextCollection> {
    let doc = Document::parse(html);
    let main_text = reconstruct_main_text(&doc)?;
    let vocabulary = extract_vocabulary(&doc, min_level)?;

    Ok(ArticleTextCollection { metadata, main_text, vocabulary })
}
