use std::collections::HashMap;

use super::record::AdvisoryRecord;

/// Latest advisory per slug, iterated in first-seen slug order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledMap {
    records: Vec<AdvisoryRecord>,
    index: HashMap<String, usize>,
}

impl ReconciledMap {
    /// Inserts `record`, replacing any earlier record for the same slug
    /// while keeping that slug's original position.
    fn upsert(mut self, record: AdvisoryRecord) -> Self {
        match self.index.get(&record.slug) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(record.slug.clone(), self.records.len());
                self.records.push(record);
            }
        }
        self
    }

    pub fn get(&self, slug: &str) -> Option<&AdvisoryRecord> {
        self.index.get(slug).map(|&pos| &self.records[pos])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.slug.as_str())
    }
}

impl FromIterator<AdvisoryRecord> for ReconciledMap {
    fn from_iter<I: IntoIterator<Item = AdvisoryRecord>>(iter: I) -> Self {
        reconcile(iter)
    }
}

impl<'a> IntoIterator for &'a ReconciledMap {
    type Item = &'a AdvisoryRecord;
    type IntoIter = std::slice::Iter<'a, AdvisoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Folds records in upstream order; the last record for a slug wins outright.
///
/// Publish dates are not compared, only input order.
pub fn reconcile<I>(records: I) -> ReconciledMap
where
    I: IntoIterator<Item = AdvisoryRecord>,
{
    records
        .into_iter()
        .fold(ReconciledMap::default(), ReconciledMap::upsert)
}
