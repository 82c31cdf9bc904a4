//! Markdown rendering of the daily digest.
//!
//! Each entry becomes one block; blocks are separated by a blank line:
//!
//! ```text
//! 🔥 **#1: Title**
//! 📌 **Source**: Reuters
//! 🌍 **Link**: [Read more](https://example.com/story)
//! 📝 **AI Brief**: Summary and inferred impact.
//! ```

use crate::models::DigestEntry;
use itertools::Itertools;

/// Label wrapping the article link.
pub const LINK_LABEL: &str = "Read more";

/// Render a single digest entry.
pub fn entry_to_markdown(entry: &DigestEntry) -> String {
    format!(
        "🔥 **#{rank}: {title}**\n\
         📌 **Source**: {source}\n\
         🌍 **Link**: [{LINK_LABEL}]({url})\n\
         📝 **AI Brief**: {summary}",
        rank = entry.rank,
        title = entry.article.title,
        source = entry.article.source.name,
        url = entry.article.url,
        summary = entry.summary.ai_text,
    )
}

/// Render every entry in order, joined by a blank line.
pub fn digest_to_markdown(entries: &[DigestEntry]) -> String {
    entries.iter().map(entry_to_markdown).join("\n\n")
}
