//! HTML parsing and DOM access.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! extractors: tag/attribute queries through CSS selectors, attribute and
//! text lookup, and raw markup serialization of a subtree for offset scans.
//!
//! # Example
//!
//! ```rust
//! use beanpress_core::parse::Document;
//!
//! let html = r#"<p><abbr rel="tooltip" title="good (HSK1)"><span class="tr">好</span></abbr></p>"#;
//! let doc = Document::parse(html);
//! let words = doc.select(r#"abbr[rel="tooltip"]"#).unwrap();
//! assert_eq!(words.len(), 1);
//! assert_eq!(words[0].attr("title"), Some("good (HSK1)"));
//! ```

use scraper::{Html, Selector};

use crate::{BeanpressError, Result};

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BeanpressError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// Parsing never fails: html5ever recovers from malformed markup the same
/// way a browser would, so the extractors always have a tree to work on.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the underlying `scraper::Html`.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`BeanpressError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the serialized markup of this element, including its own tags.
    ///
    /// The sentence reconstructor scans this string by offset, so it must be
    /// the serializer's output and not the original source text.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Iterates over the classes of this element.
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.element.value().classes()
    }

    /// Returns `true` if the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`BeanpressError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(|el| Element { element: el }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="zh">
        <head>
            <meta charset="UTF-8">
            <title>Lesson</title>
        </head>
        <body>
            <article class="elementor-post tag-hsk4 tag-culture">
                <p class="content">First</p>
                <p class="content">Second</p>
                <a href="https://example.com">Link</a>
            </article>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML);
        assert_eq!(doc.title(), Some("Lesson".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML);
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "First");
        assert_eq!(elements[1].text(), "Second");
        assert_eq!(elements[0].tag_name(), "p");
    }

    #[test]
    fn test_select_first_descendant() {
        let doc = Document::parse(SAMPLE_HTML);
        let article = doc.select_first("article").unwrap().unwrap();
        let link = article.select_first("a").unwrap().unwrap();

        assert_eq!(link.attr("href"), Some("https://example.com"));
        assert!(article.select_first("table").unwrap().is_none());
    }

    #[test]
    fn test_classes() {
        let doc = Document::parse(SAMPLE_HTML);
        let article = doc.select_first("article").unwrap().unwrap();

        assert!(article.has_class("tag-hsk4"));
        assert!(!article.has_class("tag-hsk5"));
        assert_eq!(article.classes().count(), 3);
    }

    #[test]
    fn test_outer_html_keeps_own_tags() {
        let doc = Document::parse("<p>你好<b>!</b></p>");
        let p = doc.select_first("p").unwrap().unwrap();

        assert_eq!(p.outer_html(), "<p>你好<b>!</b></p>");
        assert_eq!(p.inner_html(), "你好<b>!</b>");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(BeanpressError::HtmlParseError(_))));
    }
}
