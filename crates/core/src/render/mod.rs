//! Document rendering.
//!
//! Every renderer lays out the same content per lesson: the Chinese title,
//! a subtitle with the English title and tags, the reconstructed text, then
//! the vocabulary flowed into two-column pages by [`crate::layout::flow`].

pub mod docx;
pub mod markdown;
pub mod text;

use std::fmt;
use std::str::FromStr;

use crate::Result;
use crate::article::ArticleTextCollection;
use crate::layout::DEFAULT_COLUMN_CAPACITY;

pub use docx::render_docx;
pub use markdown::render_markdown;
pub use text::render_text;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// WordprocessingML package, ready to print.
    Docx,
    /// Markdown with one table per vocabulary page.
    Markdown,
    /// Plain text, vocabulary pages separated by form feeds.
    Text,
}

impl OutputFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" | "word" => Ok(Self::Docx),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: docx, markdown, text", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// Layout settings shared by all renderers.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Vocabulary entries per column (default: 17).
    pub column_capacity: usize,
    /// Main text font size in points (docx only, default: 16).
    pub body_font_pt: u32,
    /// Vocabulary font size in points (docx only, default: 10).
    pub word_font_pt: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { column_capacity: DEFAULT_COLUMN_CAPACITY, body_font_pt: 16, word_font_pt: 10 }
    }
}

/// Renders lessons in the requested format.
pub fn render(collections: &[ArticleTextCollection], format: OutputFormat, config: &RenderConfig) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Docx => render_docx(collections, config),
        OutputFormat::Markdown => render_markdown(collections, config).map(String::into_bytes),
        OutputFormat::Text => render_text(collections, config).map(String::into_bytes),
    }
}
