//! Vocabulary extraction from tooltip annotations.
//!
//! Each annotated word looks like this in the lesson pages:
//!
//! ```html
//! <abbr rel="tooltip" title="zhōng guó&#10;China (HSK1)">
//!   <ruby><span class="si">中国</span><span class="tr">中國</span><rt>Zhōngguó</rt></ruby>
//! </abbr>
//! ```
//!
//! The last line of the title holds the gloss with an embedded `HSK<N>`
//! marker. Words explicitly below the configured level are left out; words
//! with no marker are kept.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::parse::{Document, Element};

/// Default minimum HSK level for vocabulary entries.
pub const DEFAULT_MIN_LEVEL: u32 = 4;

const ANNOTATION_SELECTOR: &str = r#"abbr[rel="tooltip"]"#;

static DIFFICULTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"HSK(\d+)").unwrap());

/// One annotated vocabulary word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedWord {
    /// Simplified form, when the annotation renders one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified: Option<String>,
    pub traditional: String,
    pub pronunciation: String,
    /// Last line of the tooltip, difficulty marker included.
    pub gloss: String,
    /// `None` when the gloss carries no `HSK<N>` marker.
    pub difficulty_level: Option<u32>,
}

/// Returns the gloss line of a tooltip title: its last line.
pub fn gloss_line(title: &str) -> &str {
    title.split('\n').next_back().unwrap_or(title)
}

/// Parses the first `HSK<digits>` marker of a gloss line.
///
/// A digit run too long to fit a `u32` counts as no marker at all.
pub fn parse_difficulty(gloss: &str) -> Option<u32> {
    DIFFICULTY
        .captures(gloss)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Level filter: explicit levels below `min_level` fail, unknown levels pass.
pub fn passes_level_filter(level: Option<u32>, min_level: u32) -> bool {
    level.is_none_or(|level| level >= min_level)
}

/// Extracts every annotated word at or above `min_level`, in document order.
///
/// Extraction does not deduplicate. An annotation missing its title, its
/// traditional span or its pronunciation is skipped on its own.
pub fn extract_vocabulary(doc: &Document, min_level: u32) -> Result<Vec<AnnotatedWord>> {
    let mut words = Vec::new();

    for annotation in doc.select(ANNOTATION_SELECTOR)? {
        let Some(title) = annotation.attr("title") else {
            debug!(markup = %annotation.outer_html(), "annotation without title, skipping");
            continue;
        };

        let gloss = gloss_line(title);
        let difficulty_level = parse_difficulty(gloss);
        if !passes_level_filter(difficulty_level, min_level) {
            continue;
        }

        match annotated_word(&annotation, gloss, difficulty_level)? {
            Some(word) => words.push(word),
            None => debug!(gloss, "annotation missing traditional or pronunciation span, skipping"),
        }
    }

    Ok(words)
}

fn annotated_word(annotation: &Element<'_>, gloss: &str, difficulty_level: Option<u32>) -> Result<Option<AnnotatedWord>> {
    let Some(traditional) = annotation.select_first(".tr")? else {
        return Ok(None);
    };
    let Some(pronunciation) = annotation.select_first("rt")? else {
        return Ok(None);
    };
    let simplified = annotation.select_first(".si")?.map(|si| si.text());

    Ok(Some(AnnotatedWord {
        simplified,
        traditional: traditional.text(),
        pronunciation: pronunciation.text().replace('\u{a0}', " "),
        gloss: gloss.to_string(),
        difficulty_level,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn annotation(title: &str, simplified: &str, traditional: &str, pinyin: &str) -> String {
        format!(
            r#"<abbr rel="tooltip" title="{title}"><ruby><span class="si">{simplified}</span><span class="tr">{traditional}</span><rt>{pinyin}</rt></ruby></abbr>"#
        )
    }

    fn page(body: &str) -> Document {
        Document::parse(&format!("<html><body><p>{}</p></body></html>", body))
    }

    #[rstest]
    #[case("China (HSK1)", Some(1))]
    #[case("to cultivate (HSK6)", Some(6))]
    #[case("(HSK12) rare", Some(12))]
    #[case("no marker here", None)]
    #[case("hsk4 lowercase", None)]
    #[case("HSK", None)]
    #[case("HSK99999999999999999999", None)]
    fn test_parse_difficulty(#[case] gloss: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_difficulty(gloss), expected);
    }

    #[rstest]
    #[case(Some(2), 4, false)]
    #[case(Some(4), 4, true)]
    #[case(Some(6), 4, true)]
    #[case(None, 4, true)]
    #[case(Some(0), 0, true)]
    fn test_passes_level_filter(#[case] level: Option<u32>, #[case] min: u32, #[case] expected: bool) {
        assert_eq!(passes_level_filter(level, min), expected);
    }

    #[test]
    fn test_gloss_line_is_last_line() {
        assert_eq!(gloss_line("zhōng guó\nChina (HSK1)"), "China (HSK1)");
        assert_eq!(gloss_line("single line"), "single line");
        assert_eq!(gloss_line(""), "");
    }

    #[test]
    fn test_extract_filters_by_level() {
        let body = format!(
            "{}{}",
            annotation("nǐ hǎo&#10;hello (HSK2)", "你好", "你好", "nǐhǎo"),
            annotation("péi yǎng&#10;to cultivate (HSK6)", "培养", "培養", "péiyǎng"),
        );
        let words = extract_vocabulary(&page(&body), 4).unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].traditional, "培養");
        assert_eq!(words[0].simplified.as_deref(), Some("培养"));
        assert_eq!(words[0].pronunciation, "péiyǎng");
        assert_eq!(words[0].gloss, "to cultivate (HSK6)");
        assert_eq!(words[0].difficulty_level, Some(6));
    }

    #[test]
    fn test_extract_keeps_unknown_level() {
        let body = annotation("a proper name", "王", "王", "Wáng");
        let words = extract_vocabulary(&page(&body), 4).unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].difficulty_level, None);
    }

    #[test]
    fn test_extract_min_level_zero_keeps_everything() {
        let body = format!(
            "{}{}",
            annotation("I (HSK1)", "我", "我", "wǒ"),
            annotation("you (HSK1)", "你", "你", "nǐ"),
        );
        assert_eq!(extract_vocabulary(&page(&body), 0).unwrap().len(), 2);
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let body = format!(
            "{}{}{}",
            annotation("economy (HSK4)", "经济", "經濟", "jīngjì"),
            annotation("environment (HSK4)", "环境", "環境", "huánjìng"),
            annotation("economy (HSK4)", "经济", "經濟", "jīngjì"),
        );
        let words = extract_vocabulary(&page(&body), 4).unwrap();
        let traditional: Vec<&str> = words.iter().map(|w| w.traditional.as_str()).collect();

        assert_eq!(traditional, vec!["經濟", "環境", "經濟"]);
    }

    #[test]
    fn test_extract_skips_malformed_annotation_only() {
        let broken = r#"<abbr rel="tooltip" title="lost (HSK5)"><ruby><span class="si">丢</span><rt>diū</rt></ruby></abbr>"#;
        let body = format!("{}{}", broken, annotation("habit (HSK5)", "习惯", "習慣", "xíguàn"));
        let words = extract_vocabulary(&page(&body), 4).unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].traditional, "習慣");
    }

    #[test]
    fn test_extract_skips_annotation_without_title() {
        let body = r#"<abbr rel="tooltip"><ruby><span class="tr">謎</span><rt>mí</rt></ruby></abbr>"#;
        assert!(extract_vocabulary(&page(body), 0).unwrap().is_empty());
    }

    #[test]
    fn test_extract_ignores_plain_abbr() {
        let body = r#"<abbr title="World Health Organization">WHO</abbr>"#;
        assert!(extract_vocabulary(&page(body), 0).unwrap().is_empty());
    }

    #[test]
    fn test_pronunciation_nbsp_normalized() {
        let body = annotation("Chinese language (HSK4)", "中文", "中文", "Zhōng&nbsp;wén");
        let words = extract_vocabulary(&page(&body), 4).unwrap();

        assert_eq!(words[0].pronunciation, "Zhōng wén");
    }

    #[test]
    fn test_word_serialization_round_trips_unicode() {
        let word = AnnotatedWord {
            simplified: None,
            traditional: "環境".to_string(),
            pronunciation: "huánjìng".to_string(),
            gloss: "environment (HSK4)".to_string(),
            difficulty_level: Some(4),
        };
        let json = serde_json::to_string(&word).unwrap();

        assert!(json.contains("環境"));
        assert!(!json.contains("simplified"));
        assert_eq!(serde_json::from_str::<AnnotatedWord>(&json).unwrap(), word);
    }
}
