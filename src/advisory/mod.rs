//! Advisory extraction: from upstream RSS entries to one record per country.
//!
//! - [`slug`] - derive a country slug from an advisory page name
//! - [`record`] - normalize an entry into an [`AdvisoryRecord`]
//! - [`reconcile`] - keep the last record seen for each slug

pub mod reconcile;
pub mod record;
pub mod slug;

pub use reconcile::{reconcile, ReconciledMap};
pub use record::{country_from_title, AdvisoryRecord, FeedItem, RawEntry};
pub use slug::{extract_from_link, extract_slug, SlugMatch};
