use once_cell::sync::Lazy;
use regex::Regex;

/// Outcome of running an advisory page name through the slug rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugMatch {
    /// A rule matched and produced this lowercase slug.
    Matched(String),
    /// No rule recognized the page name.
    Unmatched,
}

/// A single naming convention used by the advisory site.
enum SlugRule {
    /// The whole page name must equal `page`; yields a fixed slug.
    Exact { page: &'static str, slug: &'static str },
    /// Capture group 1 of the pattern is the slug.
    Capture(Regex),
}

impl SlugRule {
    fn capture(pattern: &str) -> Self {
        SlugRule::Capture(Regex::new(pattern).expect("slug pattern is a valid regex"))
    }

    fn apply(&self, page: &str) -> SlugMatch {
        match self {
            SlugRule::Exact { page: expected, slug } if page == *expected => {
                SlugMatch::Matched((*slug).to_string())
            }
            SlugRule::Exact { .. } => SlugMatch::Unmatched,
            SlugRule::Capture(re) => re
                .captures(page)
                .and_then(|caps| caps.get(1))
                .map(|m| SlugMatch::Matched(m.as_str().to_string()))
                .unwrap_or(SlugMatch::Unmatched),
        }
    }
}

// Specific names first: the generic `<slug>.html` rule would otherwise
// swallow `france-travel-advisory.html` as "france-travel-advisory".
static RULES: Lazy<Vec<SlugRule>> = Lazy::new(|| {
    vec![
        SlugRule::Exact {
            page: "worldwide-caution.html",
            slug: "worldwide",
        },
        SlugRule::capture(r"^([a-z-]+)-travel-advisory\.html"),
        SlugRule::capture(r"^([a-z-]+)-advisory\.html"),
        SlugRule::capture(r"^([a-z-]+)\.html"),
    ]
});

/// Derives a slug from the final path segment of an advisory URL.
///
/// Matching is case-insensitive; the returned slug is always lowercase.
/// Rules are tried in order and the first match wins.
pub fn extract_slug(page: &str) -> SlugMatch {
    let page = page.to_lowercase();
    RULES
        .iter()
        .map(|rule| rule.apply(&page))
        .find(|m| matches!(m, SlugMatch::Matched(_)))
        .unwrap_or(SlugMatch::Unmatched)
}

/// Derives a slug from a full advisory link.
///
/// Only the text after the last `/` is considered, so a link ending in `/`
/// never matches.
pub fn extract_from_link(link: &str) -> SlugMatch {
    extract_slug(last_path_segment(link))
}

fn last_path_segment(link: &str) -> &str {
    let path = match link.find(&['?', '#'][..]) {
        Some(idx) => &link[..idx],
        None => link,
    };
    path.rsplit('/').next().unwrap_or(path)
}
