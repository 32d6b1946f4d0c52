//! Republishes U.S. State Department travel advisories as JSON feeds.
//!
//! The upstream RSS feed lists one advisory per country. Each run derives a
//! slug per advisory, keeps the last advisory per slug, and writes one
//! JSON Feed 1.1 document per country plus an optional combined feed.

pub mod advisory;
pub mod config;
pub mod feed;
pub mod jsonfeed;
pub mod output;
pub mod pipeline;
