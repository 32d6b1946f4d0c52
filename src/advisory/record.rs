use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One upstream RSS item, as handed over by the source layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub link: String,
    pub title: String,
    /// HTML summary of the advisory.
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

/// A JSON Feed item describing a single advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub content_html: String,
    #[serde(with = "rfc3339_seconds")]
    pub date_published: DateTime<Utc>,
}

/// The canonical advisory for one country within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRecord {
    pub slug: String,
    pub item: FeedItem,
}

impl AdvisoryRecord {
    /// Builds the record for `entry`, whose publish time is already known.
    ///
    /// Fractional seconds are dropped so `id` and `date_published` agree.
    pub fn new(slug: &str, entry: RawEntry, published: DateTime<Utc>) -> Self {
        let published = published.trunc_subsecs(0);
        Self {
            slug: slug.to_string(),
            item: FeedItem {
                id: format!("{}-{}", slug, published.timestamp()),
                url: entry.link,
                title: entry.title,
                content_html: entry.summary,
                date_published: published,
            },
        }
    }

    /// Normalizes an entry, or returns `None` when it carries no publish date.
    pub fn from_entry(slug: &str, entry: RawEntry) -> Option<Self> {
        let published = entry.published?;
        Some(Self::new(slug, entry, published))
    }

    /// Country display name: the title up to the first `" - "`.
    pub fn country(&self) -> &str {
        country_from_title(&self.item.title)
    }
}

pub fn country_from_title(title: &str) -> &str {
    title.split_once(" - ").map_or(title, |(country, _)| country)
}

mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
