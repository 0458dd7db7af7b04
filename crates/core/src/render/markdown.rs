use super::RenderConfig;
use crate::Result;
use crate::article::ArticleTextCollection;
use crate::layout::Page;

/// Render lessons as Markdown, one section per lesson separated by rules
pub fn render_markdown(collections: &[ArticleTextCollection], config: &RenderConfig) -> Result<String> {
    let sections = collections
        .iter()
        .map(|collection| render_section(collection, config))
        .collect::<Result<Vec<String>>>()?;

    Ok(sections.join("\n---\n\n"))
}

fn render_section(collection: &ArticleTextCollection, config: &RenderConfig) -> Result<String> {
    let pages = collection.pages(config.column_capacity)?;
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", collection.metadata.chinese_title));
    output.push_str(&format!("## {}\n\n", collection.subtitle()));

    for line in &collection.main_text {
        output.push_str(line);
        output.push_str("\n\n");
    }

    for (i, page) in pages.iter().enumerate() {
        output.push_str(&format!("### Vocabulary ({}/{})\n\n", i + 1, pages.len()));
        output.push_str(&generate_table(page));
        output.push('\n');
    }

    Ok(output)
}

/// Generate a two-column table from one vocabulary page
fn generate_table(page: &Page) -> String {
    let mut table = String::from("| | |\n|---|---|\n");

    for (left, right) in page.rows() {
        table.push_str(&format!(
            "| {} | {} |\n",
            escape_pipe(left.unwrap_or_default()),
            escape_pipe(right.unwrap_or_default())
        ));
    }

    table
}

/// Escape pipe characters for Markdown tables
fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}
