//! The catalog: every known record, keyed by absolute file path.

mod query;
mod store;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::library::Record;

pub use query::sort_records;
pub use store::{CatalogStore, Loaded};

/// Path-keyed record map. A record's `full_path` is always equal to the key
/// it is stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    records: BTreeMap<String, Record>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Insert under `record.full_path`, replacing whatever was there.
    pub(crate) fn insert(&mut self, record: Record) -> Result<Option<Record>> {
        if record.full_path.is_empty() {
            return Err(Error::Validation("record has no full path".into()));
        }
        Ok(self.records.insert(record.full_path.clone(), record))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Record> {
        self.records.remove(key)
    }

    /// Put back a previously observed value of `key` (or its absence).
    pub(crate) fn restore(&mut self, key: String, prior: Option<Record>) {
        match prior {
            Some(record) => {
                self.records.insert(key, record);
            }
            None => {
                self.records.remove(&key);
            }
        }
    }

    /// Build a catalog from a raw key/record map, forcing every record's
    /// `full_path` to match its key. Returns the number of repaired entries;
    /// entries with an empty key are dropped and counted too.
    pub(crate) fn from_map(map: BTreeMap<String, Record>) -> (Self, usize) {
        let mut repaired = 0;
        let mut records = BTreeMap::new();
        for (key, mut record) in map {
            if key.is_empty() {
                repaired += 1;
                continue;
            }
            if record.full_path != key {
                record.full_path = key.clone();
                repaired += 1;
            }
            records.insert(key, record);
        }
        (Self { records }, repaired)
    }
}

impl FromIterator<Record> for Catalog {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let records = iter
            .into_iter()
            .filter(|r| !r.full_path.is_empty())
            .map(|r| (r.full_path.clone(), r))
            .collect();
        Self { records }
    }
}
