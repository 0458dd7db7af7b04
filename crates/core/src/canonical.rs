//! Vocabulary normalization and deduplication.
//!
//! Turns extracted words into display entries of the form
//! `"<traditional> (<pronunciation>): <Gloss>"` and collects them into an
//! insertion-ordered [`WordSet`]. The gloss heuristics are kept as separate
//! functions since they track quirks of the source content.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::vocabulary::AnnotatedWord;

static DIFFICULTY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(HSK\d+\)").unwrap());

/// Glosses opening with a parenthesis describe grammar patterns, not words.
pub fn is_grammar_annotation(gloss: &str) -> bool {
    gloss.starts_with('(')
}

/// Title-cases text: the first cased letter of every run of cased letters is
/// upper-cased and the rest lower-cased. Apostrophes and digits break runs,
/// so `"don't"` becomes `"Don'T"`.
pub fn title_case(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_cased = false;

    for c in text.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && previous_cased {
            output.extend(c.to_lowercase());
        } else if cased {
            output.extend(c.to_uppercase());
        } else {
            output.push(c);
        }
        previous_cased = cased;
    }

    output
}

/// Undoes what [`title_case`] does to the difficulty abbreviation.
pub fn restore_difficulty_abbreviation(text: &str) -> String {
    text.replace("Hsk", "HSK")
}

/// Removes every `(HSK<digits>)` tag and the whitespace before it, then trims.
pub fn strip_difficulty_tags(text: &str) -> String {
    let mut current = text.to_string();
    while DIFFICULTY_TAG.is_match(&current) {
        current = DIFFICULTY_TAG.replace_all(&current, "").into_owned();
    }
    current.trim().to_string()
}

/// Formats a word for display, or `None` if it is a grammar annotation.
pub fn format_entry(word: &AnnotatedWord) -> Option<String> {
    let gloss = restore_difficulty_abbreviation(&title_case(&word.gloss));
    if is_grammar_annotation(&gloss) {
        return None;
    }

    Some(format!(
        "{} ({}): {}",
        word.traditional.trim(),
        word.pronunciation.trim(),
        strip_difficulty_tags(&gloss)
    ))
}

/// Normalizes an already formatted entry.
fn sanitize_entry(entry: &str) -> String {
    strip_difficulty_tags(entry)
}

/// Builds the canonical, deduplicated vocabulary of an article.
pub fn canonicalize(words: &[AnnotatedWord]) -> WordSet {
    words
        .iter()
        .filter_map(format_entry)
        .map(|entry| sanitize_entry(&entry))
        .collect()
}

/// Normalizes formatted entries (for instance lines read back from a word
/// list), dropping blanks and duplicates. Applying it to its own output
/// returns the same set.
pub fn canonicalize_entries<I, S>(entries: I) -> WordSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| sanitize_entry(entry.as_ref()))
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// A set of display entries that iterates in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning `false` if it was already present.
    pub fn insert(&mut self, entry: String) -> bool {
        if self.seen.contains(&entry) {
            return false;
        }
        self.seen.insert(entry.clone());
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.seen.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

impl FromIterator<String> for WordSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = WordSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl IntoIterator for WordSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a WordSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
