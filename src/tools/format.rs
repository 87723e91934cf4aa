//! Markdown rendering of Notion objects for tool results.

use std::fmt::Write;

use crate::notion::{
    model::{plain_text, Database},
    Block, BlockContent, Page, SearchResult,
};

const SNIPPET_MAX_CHARS: usize = 150;

/// Property names already shown as the row title in query listings.
const TITLE_PROPERTY_NAMES: [&str; 2] = ["Name", "title"];

/// Date part of an ISO-8601 timestamp.
fn date_only(timestamp: Option<&str>) -> &str {
    timestamp
        .map(|ts| ts.split('T').next().unwrap_or(ts))
        .unwrap_or("unknown")
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

/// One block as a single markdown line (code blocks span several lines).
pub fn render_block(content: &BlockContent) -> String {
    let text = plain_text(content.rich_text());
    match content {
        BlockContent::Paragraph(_) => text,
        BlockContent::Heading1(_) => format!("# {}", text),
        BlockContent::Heading2(_) => format!("## {}", text),
        BlockContent::Heading3(_) => format!("### {}", text),
        BlockContent::BulletedListItem(_) => format!("• {}", text),
        BlockContent::NumberedListItem(_) => format!("1. {}", text),
        BlockContent::ToDo { checked, .. } => {
            format!("{} {}", if *checked { "☑" } else { "☐" }, text)
        }
        BlockContent::Code { language, .. } => format!("```{}\n{}\n```", language, text),
        BlockContent::Quote(_) => format!("> {}", text),
        BlockContent::Divider => "---".to_string(),
        BlockContent::Other { kind, .. } => format!("[{} block]", kind),
    }
}

/// Indented block tree, two spaces per nesting level. Empty lines are skipped.
pub fn render_block_tree(blocks: &[Block], indent: usize) -> String {
    let mut out = String::new();
    let pad = "  ".repeat(indent);
    for block in blocks {
        let line = render_block(&block.content);
        if !line.is_empty() {
            let _ = writeln!(out, "{}{}", pad, line);
        }
        if !block.children.is_empty() {
            out.push_str(&render_block_tree(&block.children, indent + 1));
        }
    }
    out
}

pub fn format_page(page: &Page, content: Option<&[Block]>) -> String {
    let mut out = String::from("# Page Information\n\n");
    if let Some(title) = page.title() {
        let _ = writeln!(out, "**Title:** {}", title);
    }
    let _ = writeln!(out, "**ID:** {}", page.id);
    let _ = writeln!(out, "**URL:** {}", or_na(page.url.as_deref()));
    let _ = writeln!(out, "**Created:** {}", or_na(page.created_time.as_deref()));
    let _ = writeln!(
        out,
        "**Last edited:** {}",
        or_na(page.last_edited_time.as_deref())
    );

    if let Some(blocks) = content.filter(|b| !b.is_empty()) {
        out.push_str("\n## Content\n\n");
        for block in blocks {
            let _ = writeln!(out, "{}", render_block(&block.content));
        }
    }
    out
}

pub fn format_created_page(title: &str, page: &Page) -> String {
    format!(
        "Created page \"{}\" with ID: {}\nURL: {}",
        title,
        page.id,
        or_na(page.url.as_deref())
    )
}

pub fn format_updated_page(page_id: &str, title: Option<&str>, archived: Option<bool>) -> String {
    let mut out = format!("Updated page {}", page_id);
    if let Some(title) = title {
        let _ = write!(out, " with new title \"{}\"", title);
    }
    if let Some(archived) = archived {
        let _ = write!(out, " (archived: {})", archived);
    }
    out
}

pub fn format_query_results(pages: &[Page]) -> String {
    let mut out = format!("Found {} items:\n\n", pages.len());
    for page in pages {
        let _ = writeln!(out, "- **{}** (ID: {})", page.title_or_untitled(), page.id);
        for (name, value) in page.properties.iter() {
            if TITLE_PROPERTY_NAMES.contains(&name) {
                continue;
            }
            let shown = value.display();
            if !shown.is_empty() {
                let _ = writeln!(out, "  - {}: {}", name, shown);
            }
        }
        out.push('\n');
    }
    out
}

pub fn format_schema(database: &Database) -> String {
    let mut out = format!(
        "# Database Schema: {}\n\n",
        database.title().unwrap_or("Untitled")
    );
    let _ = writeln!(out, "**ID:** {}", database.id);
    let _ = writeln!(
        out,
        "**Created:** {}\n",
        or_na(database.created_time.as_deref())
    );
    out.push_str("## Properties\n\n");

    for (name, property) in database.properties.iter() {
        let _ = writeln!(out, "### {}", name);
        let _ = writeln!(out, "- Type: {}", property.kind);
        let options = match property.kind.as_str() {
            "select" => property.select.as_ref(),
            "multi_select" => property.multi_select.as_ref(),
            _ => None,
        };
        if let Some(options) = options {
            let names: Vec<&str> = options.options.iter().map(|o| o.name.as_str()).collect();
            let _ = writeln!(out, "- Options: {}", names.join(", "));
        }
        if property.kind == "relation" {
            let target = property
                .relation
                .as_ref()
                .and_then(|r| r.database_id.as_deref());
            let _ = writeln!(out, "- Related database: {}", or_na(target));
        }
        out.push('\n');
    }
    out
}

pub fn format_search_results(
    results: &[SearchResult],
    query: Option<&str>,
    has_more: bool,
    page_size: u32,
) -> String {
    let mut out = String::from("# Search Results\n\n");
    let _ = write!(out, "Found {} items", results.len());
    if let Some(query) = query {
        let _ = write!(out, " for \"{}\"", query);
    }
    out.push_str("\n\n");

    for result in results {
        match result {
            SearchResult::Page(page) => {
                let _ = writeln!(out, "## 📄 Page: {}", page.title_or_untitled());
                let _ = writeln!(out, "- **ID:** {}", page.id);
                let _ = writeln!(out, "- **URL:** {}", or_na(page.url.as_deref()));
                let _ = writeln!(
                    out,
                    "- **Created:** {}",
                    date_only(page.created_time.as_deref())
                );
                let _ = writeln!(
                    out,
                    "- **Last edited:** {}",
                    date_only(page.last_edited_time.as_deref())
                );
                if let Some(database_id) = page.parent_database() {
                    let _ = writeln!(out, "- **In database:** {}", database_id);
                }
            }
            SearchResult::Database(db) => {
                let _ = writeln!(
                    out,
                    "## 🗄️ Database: {}",
                    db.title().unwrap_or("Untitled Database")
                );
                let _ = writeln!(out, "- **ID:** {}", db.id);
                let _ = writeln!(out, "- **URL:** {}", or_na(db.url.as_deref()));
                let _ = writeln!(
                    out,
                    "- **Created:** {}",
                    date_only(db.created_time.as_deref())
                );
                let _ = writeln!(out, "- **Properties:** {}", db.properties.len());
            }
        }
        out.push('\n');
    }

    if has_more {
        let _ = write!(
            out,
            "\n*More results available. Showing first {} results.*",
            page_size
        );
    }
    out
}

/// A title-search hit with its content preview.
pub struct TitleMatch<'a> {
    pub page: &'a Page,
    pub snippet: String,
}

pub fn format_title_matches(matches: &[TitleMatch<'_>], title: &str, exact: bool) -> String {
    let mut out = String::from("# Title Search Results\n\n");
    let _ = write!(
        out,
        "Found {} pages matching \"{}\"",
        matches.len(),
        title
    );
    if exact {
        out.push_str(" (exact match)");
    }
    out.push_str("\n\n");

    for hit in matches {
        let page = hit.page;
        let _ = writeln!(out, "## {}", page.title_or_untitled());
        let _ = writeln!(out, "- **ID:** {}", page.id);
        let _ = writeln!(out, "- **URL:** {}", or_na(page.url.as_deref()));
        let _ = writeln!(
            out,
            "- **Last edited:** {}",
            date_only(page.last_edited_time.as_deref())
        );
        if let Some(database_id) = page.parent_database() {
            let _ = writeln!(out, "- **Database:** {}", database_id);
        }
        if !hit.snippet.is_empty() {
            let _ = writeln!(out, "- **Preview:** {}", hit.snippet);
        }
        out.push('\n');
    }

    if matches.is_empty() {
        let _ = write!(
            out,
            "No pages found with title {} \"{}\"",
            if exact { "exactly matching" } else { "containing" },
            title
        );
    }
    out
}

/// Space-joined text of the given blocks, cut to 150 characters.
pub fn snippet(blocks: &[Block]) -> String {
    let full = blocks
        .iter()
        .map(|b| plain_text(b.content.rich_text()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full.chars().count() > SNIPPET_MAX_CHARS {
        let cut: String = full.chars().take(SNIPPET_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        full
    }
}
