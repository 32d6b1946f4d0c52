//! One batch run: upstream entries in, feed files out.

use std::path::{Path, PathBuf};

use crate::advisory::{
    extract_from_link, reconcile, AdvisoryRecord, RawEntry, ReconciledMap, SlugMatch,
};
use crate::jsonfeed::{combined_feed, country_feed, FeedSettings};
use crate::output::{write_all, OutputError, OutputSet};

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub countries: usize,
    /// Entries dropped for an unrecognized link or a missing publish date.
    pub skipped: usize,
    pub written: Vec<PathBuf>,
}

/// Splits a `--combine-countries` value into slugs.
///
/// An empty value means no combined feed (`None`). Any other value requests
/// one, even if every segment is blank: blank segments are logged and
/// dropped, leaving a combined feed with no items.
pub fn parse_combine_list(raw: &str) -> Option<Vec<String>> {
    if raw.is_empty() {
        return None;
    }
    let slugs = raw
        .split(',')
        .map(str::trim)
        .filter(|s| {
            if s.is_empty() {
                tracing::warn!(value = %raw, "Blank slug in combine list, skipping");
            }
            !s.is_empty()
        })
        .map(str::to_string)
        .collect();
    Some(slugs)
}

/// Turns a single upstream entry into a record, logging why when it can't.
pub fn normalize_entry(entry: RawEntry) -> Option<AdvisoryRecord> {
    let slug = match extract_from_link(&entry.link) {
        SlugMatch::Matched(slug) => slug,
        SlugMatch::Unmatched => {
            tracing::warn!(link = %entry.link, "Couldn't extract slug");
            return None;
        }
    };
    if entry.published.is_none() {
        tracing::warn!(link = %entry.link, slug = %slug, "Entry has no publish date, skipping");
        return None;
    }
    AdvisoryRecord::from_entry(&slug, entry)
}

/// Normalizes entries in upstream order and keeps the last one per slug.
///
/// Returns the map and the number of entries that were dropped.
pub fn build_records(entries: Vec<RawEntry>) -> (ReconciledMap, usize) {
    let total = entries.len();
    let records: Vec<AdvisoryRecord> = entries.into_iter().filter_map(normalize_entry).collect();
    let skipped = total - records.len();
    (reconcile(records), skipped)
}

/// Builds every feed document for `records`.
///
/// A combined feed is produced whenever `combine` is `Some`, even if empty.
pub fn build_outputs(
    settings: &FeedSettings,
    records: &ReconciledMap,
    combine: Option<&[String]>,
) -> OutputSet {
    let mut feeds = Vec::with_capacity(records.len());
    for record in records {
        feeds.push((record.slug.clone(), country_feed(settings, record)));
    }
    let combined = combine.map(|slugs| combined_feed(settings, records, slugs));
    OutputSet { feeds, combined }
}

/// Runs the whole transform and rewrites `output_dir`.
pub fn run(
    settings: &FeedSettings,
    entries: Vec<RawEntry>,
    output_dir: &Path,
    combine: Option<&[String]>,
) -> Result<RunSummary, OutputError> {
    let (records, skipped) = build_records(entries);
    let outputs = build_outputs(settings, &records, combine);
    let written = write_all(output_dir, &outputs)?;

    tracing::info!(
        countries = records.len(),
        skipped = skipped,
        combined = outputs.combined.is_some(),
        dir = %output_dir.display(),
        "Wrote advisory feeds"
    );

    Ok(RunSummary {
        countries: records.len(),
        skipped,
        written,
    })
}
