//! Article listing pages.
//!
//! The lesson index is a paginated grid of `article.elementor-post` cards.
//! Each card links to one lesson and carries its tags as `tag-*` classes,
//! for example `tag-hsk4 tag-culture`.

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::canonical::title_case;
use crate::parse::{Document, Element};
use crate::{BeanpressError, Result};

/// Listing of intermediate and advanced lessons.
pub const DEFAULT_LISTING_URL: &str = "https://mandarinbean.com/all-lessons/?jsf=epro-posts&tax=post_tag:12%2C9%2C20";

/// Identifying data of one lesson, as shown on the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub title: String,
    pub chinese_title: String,
    /// Lesson URL; the stable key for caching.
    pub url: String,
    /// Topic tag, title-cased (e.g. `Culture`).
    pub category_tag: String,
    /// Difficulty tag, upper-cased (e.g. `HSK4`).
    pub difficulty_tag: String,
}

/// Parses every lesson card of a listing page.
///
/// Cards missing a title, link, Chinese title or either tag are skipped with
/// a warning.
pub fn parse_listing(doc: &Document) -> Result<Vec<ArticleMetadata>> {
    let mut articles = Vec::new();

    for card in doc.select("article.elementor-post")? {
        match parse_card(&card)? {
            Some(metadata) => articles.push(metadata),
            None => warn!(class = card.attr("class").unwrap_or_default(), "incomplete lesson card, skipping"),
        }
    }

    Ok(articles)
}

fn parse_card(card: &Element<'_>) -> Result<Option<ArticleMetadata>> {
    let Some(heading) = card.select_first("span.elementor-heading-title")? else {
        return Ok(None);
    };
    let Some(url) = heading.select_first("a[href]")?.and_then(|a| a.attr("href")) else {
        return Ok(None);
    };
    let Some(chinese_title) = card.select_first("span.tr")? else {
        return Ok(None);
    };

    let tags: Vec<&str> = card
        .attr("class")
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|class| class.strip_prefix("tag-"))
        .filter(|tag| !tag.is_empty())
        .collect();

    let Some(difficulty_tag) = tags.iter().find(|tag| is_difficulty_tag(tag)) else {
        return Ok(None);
    };
    let Some(category_tag) = tags.iter().find(|tag| !is_difficulty_tag(tag)) else {
        return Ok(None);
    };

    Ok(Some(ArticleMetadata {
        title: heading.text().trim().to_string(),
        chinese_title: chinese_title.text().trim().to_string(),
        url: url.trim().to_string(),
        category_tag: title_case(category_tag),
        difficulty_tag: difficulty_tag.to_uppercase(),
    }))
}

fn is_difficulty_tag(tag: &str) -> bool {
    tag.to_lowercase().contains("hsk")
}

/// Reads the number of listing pages from the posts widget settings.
///
/// # Errors
///
/// Returns [`BeanpressError::ListingError`] if the widget, its settings or
/// the page count is missing.
pub fn parse_max_pages(doc: &Document) -> Result<u32> {
    let widget = doc
        .select_first("div.ecs-posts")?
        .ok_or_else(|| BeanpressError::ListingError("no div.ecs-posts widget".to_string()))?;
    let settings = widget
        .attr("data-settings")
        .ok_or_else(|| BeanpressError::ListingError("posts widget has no data-settings".to_string()))?;

    let settings: serde_json::Value = serde_json::from_str(settings)
        .map_err(|e| BeanpressError::ListingError(format!("invalid data-settings: {}", e)))?;

    let max_pages = match settings.get("max_num_pages") {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    max_pages
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| BeanpressError::ListingError("max_num_pages missing or invalid".to_string()))
}

/// Builds the URL of listing page `page` (1-based).
pub fn listing_page_url(base: &str, page: u32) -> Result<String> {
    let mut url = Url::parse(base).map_err(|e| BeanpressError::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut().append_pair("pagenum", &page.to_string());
    Ok(url.to_string())
}
