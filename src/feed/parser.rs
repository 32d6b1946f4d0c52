use anyhow::Result;
use feed_rs::parser;

use crate::advisory::RawEntry;

/// Entries extracted from an upstream RSS document.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Entries in document order.
    pub entries: Vec<RawEntry>,
    /// Items dropped because they carry no link.
    pub skipped: usize,
}

pub fn parse_feed(bytes: &[u8]) -> Result<ParseResult> {
    let feed = parser::parse(bytes)?;

    let mut result = ParseResult::default();
    for entry in feed.entries {
        let Some(link) = entry.links.first().map(|l| l.href.trim().to_string()) else {
            tracing::warn!(id = %entry.id, "Feed item has no link, skipping");
            result.skipped += 1;
            continue;
        };
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        result.entries.push(RawEntry {
            link,
            title,
            summary,
            published: entry.published.or(entry.updated),
        });
    }

    Ok(result)
}
