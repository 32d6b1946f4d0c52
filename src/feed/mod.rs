//! Upstream advisory feed loading.
//!
//! - [`parser`] - RSS/Atom parsing into [`RawEntry`](crate::advisory::RawEntry) values via `feed-rs`
//! - [`fetcher`] - HTTP (or local file) retrieval with timeout and size limits

mod fetcher;
mod parser;

pub use fetcher::{load_entries, FeedSource, FetchError, FetchLimits};
pub use parser::{parse_feed, ParseResult};
