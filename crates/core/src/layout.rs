//! Column/page flow for vocabulary lists.
//!
//! Entries fill the first column of a page, then the second; once both are
//! full the next entry opens a new page.

use serde::Serialize;

use crate::{BeanpressError, Result};

/// Default number of entries a vocabulary column holds.
pub const DEFAULT_COLUMN_CAPACITY: usize = 17;

/// One printed vocabulary page with two columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub column1: Vec<String>,
    pub column2: Vec<String>,
}

impl Page {
    /// Total number of entries on the page.
    pub fn len(&self) -> usize {
        self.column1.len() + self.column2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column1.is_empty() && self.column2.is_empty()
    }

    /// Rows of the page as pairs, padding the shorter column with `None`.
    pub fn rows(&self) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
        let height = self.column1.len().max(self.column2.len());
        (0..height).map(move |i| {
            (self.column1.get(i).map(String::as_str), self.column2.get(i).map(String::as_str))
        })
    }
}

/// Flows entries into two-column pages of `capacity` entries per column.
///
/// Iteration order of `words` fixes the layout, so callers should pass an
/// ordered container such as [`crate::WordSet`]. An empty input produces no
/// pages.
///
/// # Errors
///
/// Returns [`BeanpressError::InvalidCapacity`] if `capacity` is zero.
///
/// # Example
///
/// ```rust
/// use beanpress_core::layout::flow;
///
/// let pages = flow(["a", "b", "c", "d", "e"], 2).unwrap();
/// assert_eq!(pages.len(), 2);
/// assert_eq!(pages[0].column1, vec!["a", "b"]);
/// assert_eq!(pages[0].column2, vec!["c", "d"]);
/// assert_eq!(pages[1].column1, vec!["e"]);
/// assert!(pages[1].column2.is_empty());
/// ```
pub fn flow<I, S>(words: I, capacity: usize) -> Result<Vec<Page>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    if capacity == 0 {
        return Err(BeanpressError::InvalidCapacity(capacity));
    }

    let mut pages = Vec::new();
    let mut current: Option<Page> = None;
    let mut count_column1 = 0;
    let mut count_column2 = 0;

    for word in words {
        let word = word.into();
        let page = current.get_or_insert_with(Page::default);

        if count_column1 < capacity {
            page.column1.push(word);
            count_column1 += 1;
        } else if count_column2 < capacity {
            page.column2.push(word);
            count_column2 += 1;
        } else {
            pages.push(std::mem::take(page));
            page.column1.push(word);
            count_column1 = 1;
            count_column2 = 0;
        }
    }

    pages.extend(current);
    Ok(pages)
}
