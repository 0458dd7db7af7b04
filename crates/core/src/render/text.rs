use super::RenderConfig;
use crate::Result;
use crate::article::ArticleTextCollection;
use crate::layout::Page;

/// Page separator understood by printers and pagers.
const FORM_FEED: char = '\u{c}';

/// Render lessons as plain text; lessons and vocabulary pages start on a new printed page
pub fn render_text(collections: &[ArticleTextCollection], config: &RenderConfig) -> Result<String> {
    let mut output = String::new();

    for (i, collection) in collections.iter().enumerate() {
        if i > 0 {
            output.push(FORM_FEED);
            output.push('\n');
        }

        output.push_str(&generate_header(collection));
        output.push('\n');
        output.push_str(&collection.main_text_joined());
        output.push('\n');

        let pages = collection.pages(config.column_capacity)?;
        for (n, page) in pages.iter().enumerate() {
            output.push(FORM_FEED);
            output.push('\n');
            output.push_str(&format!("[Vocabulary {}/{}]\n", n + 1, pages.len()));
            output.push_str(&format_page(page));
        }
    }

    Ok(output)
}

/// Generate a header from the lesson titles
fn generate_header(collection: &ArticleTextCollection) -> String {
    let subtitle = collection.subtitle();
    format!(
        "{}\n{}\n{}\n",
        collection.metadata.chinese_title,
        subtitle,
        "=".repeat(subtitle.chars().count())
    )
}

fn format_page(page: &Page) -> String {
    let mut text = String::new();

    for (label, column) in [("Column 1", &page.column1), ("Column 2", &page.column2)] {
        if column.is_empty() {
            continue;
        }
        text.push_str(label);
        text.push_str(":\n");
        for entry in column {
            text.push_str("  ");
            text.push_str(entry);
            text.push('\n');
        }
    }

    text
}
