//! JSON Feed 1.1 documents built from reconciled advisories.

use serde::{Deserialize, Serialize};

use crate::advisory::{AdvisoryRecord, FeedItem, ReconciledMap};

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Slug and display name used for the combined feed.
pub const COMBINED_SLUG: &str = "combined";
pub const COMBINED_COUNTRY: &str = "Combined";

/// URLs stamped onto every generated feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    /// Public feed location; `{slug}` is replaced per feed.
    pub feed_url_template: String,
    /// Landing page used when a feed has no more specific home page.
    pub home_page_url: String,
    pub icon_url: String,
}

impl FeedSettings {
    pub fn feed_url(&self, slug: &str) -> String {
        self.feed_url_template.replace("{slug}", slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDocument {
    pub version: String,
    pub title: String,
    pub home_page_url: String,
    pub feed_url: String,
    pub icon: String,
    pub items: Vec<FeedItem>,
}

/// Wraps `items` into a feed for one country (or the combined feed).
///
/// `home_page_url` overrides the settings' landing page when given.
pub fn assemble(
    settings: &FeedSettings,
    country: &str,
    slug: &str,
    items: Vec<FeedItem>,
    home_page_url: Option<&str>,
) -> FeedDocument {
    FeedDocument {
        version: JSON_FEED_VERSION.to_string(),
        title: format!("U.S. Department of State - {country} Travel Advisories"),
        home_page_url: home_page_url
            .unwrap_or(&settings.home_page_url)
            .to_string(),
        feed_url: settings.feed_url(slug),
        icon: settings.icon_url.clone(),
        items,
    }
}

/// Single-item feed for one country, linked to the advisory page itself.
pub fn country_feed(settings: &FeedSettings, record: &AdvisoryRecord) -> FeedDocument {
    assemble(
        settings,
        record.country(),
        &record.slug,
        vec![record.item.clone()],
        Some(&record.item.url),
    )
}

/// Feed of the requested slugs, newest first.
///
/// Slugs missing from `records` are logged and skipped. Request order only
/// breaks ties between identical publish dates.
pub fn combined_feed<S: AsRef<str>>(
    settings: &FeedSettings,
    records: &ReconciledMap,
    slugs: &[S],
) -> FeedDocument {
    let mut items: Vec<FeedItem> = slugs
        .iter()
        .filter_map(|slug| {
            let slug = slug.as_ref();
            let found = records.get(slug);
            if found.is_none() {
                tracing::warn!(slug = %slug, "Requested country not found, skipping");
            }
            found.map(|r| r.item.clone())
        })
        .collect();
    items.sort_by(|a, b| b.date_published.cmp(&a.date_published));

    assemble(settings, COMBINED_COUNTRY, COMBINED_SLUG, items, None)
}
