//! Reconciliation engine.
//!
//! Owns the catalog and is the only place it is mutated. Each operation runs
//! against a journal of the prior values it touched; the catalog is then
//! persisted, and if that fails the journal is replayed backwards so memory
//! and disk keep matching contents.

mod navigator;

use std::path::Path;

use log::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogStore, Loaded};
use crate::config::LibrarySettings;
use crate::error::{Error, Result};
use crate::library::{self, Record, RecordBuilder, RecordDraft, RecordPatch};
use crate::sync::{self, SyncReport};
use crate::tags::TagIo;

pub use navigator::{Boundary, CloseError, Navigator, Step};

/// Outcome of a directory import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Records created or refreshed.
    pub added: usize,
    /// Files skipped for their extension.
    pub skipped: usize,
    pub failures: Vec<(String, Error)>,
}

/// Outcome of a multi-record edit.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub updated: usize,
    pub failures: Vec<(String, Error)>,
}

#[derive(Default)]
struct Journal {
    prior: Vec<(String, Option<Record>)>,
}

impl Journal {
    fn insert(&mut self, catalog: &mut Catalog, record: Record) -> Result<()> {
        let key = record.full_path.clone();
        let prior = catalog.insert(record)?;
        self.prior.push((key, prior));
        Ok(())
    }

    fn remove(&mut self, catalog: &mut Catalog, key: &str) -> bool {
        match catalog.remove(key) {
            Some(prior) => {
                self.prior.push((key.to_string(), Some(prior)));
                true
            }
            None => false,
        }
    }

    /// Move the entry at `old_key` to `record.full_path` as one step: the
    /// new key is validated before the old entry is taken out.
    fn rename(&mut self, catalog: &mut Catalog, old_key: &str, record: Record) -> Result<()> {
        if record.full_path.is_empty() {
            return Err(Error::Validation("record has no full path".into()));
        }
        self.remove(catalog, old_key);
        self.insert(catalog, record)
    }
}

pub struct Engine<T> {
    catalog: Catalog,
    store: CatalogStore,
    tags: T,
    library: LibrarySettings,
}

impl<T: TagIo> Engine<T> {
    /// Load the catalog from `store`. The second value carries the store's
    /// corruption warning, if any.
    pub fn open(
        store: CatalogStore,
        tags: T,
        library: LibrarySettings,
    ) -> Result<(Self, Option<String>)> {
        let Loaded { catalog, warning } = store.load()?;
        info!(
            "catalog {} opened with {} record(s)",
            store.path().display(),
            catalog.len()
        );
        let engine = Self {
            catalog,
            store,
            tags,
            library,
        };
        Ok((engine, warning))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tags(&self) -> &T {
        &self.tags
    }

    fn builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(&self.tags, &self.library)
    }

    /// Add (or refresh) a single audio file.
    pub fn add_file(&mut self, path: &Path) -> Result<Record> {
        debug!("adding file {}", path.display());
        let record = self
            .builder()
            .build(path, None)
            .inspect_err(|e| error!("cannot add {}: {e}", path.display()))?;

        self.transact(|engine, journal| journal.insert(&mut engine.catalog, record.clone()))?;
        debug!("added record {}", record.full_path);
        Ok(record)
    }

    /// Add every supported file below `root`. A file that fails is reported
    /// and the walk continues.
    pub fn import_directory(&mut self, root: &Path) -> Result<ImportReport> {
        info!("importing directory {}", root.display());
        if !root.is_dir() {
            return Err(Error::file_access(root, "not a directory"));
        }

        let outcome = library::scan(root, &self.library);
        let mut report = ImportReport {
            added: 0,
            skipped: outcome.skipped,
            failures: outcome.errors,
        };

        let files = outcome.files;
        self.transact(|engine, journal| {
            for path in &files {
                match engine.builder().build(path, None) {
                    Ok(record) => {
                        journal.insert(&mut engine.catalog, record)?;
                        report.added += 1;
                    }
                    Err(e) => {
                        warn!("skipping {}: {e}", path.display());
                        report.failures.push((path.display().to_string(), e));
                    }
                }
            }
            Ok(())
        })?;

        info!(
            "import of {} done: {} added, {} skipped, {} failed; catalog now has {} record(s)",
            root.display(),
            report.added,
            report.skipped,
            report.failures.len(),
            self.catalog.len()
        );
        Ok(report)
    }

    /// Insert a caller-built record, backfilling blanks from the file.
    pub fn add_manual(&mut self, draft: RecordDraft) -> Result<Record> {
        let draft = draft.trimmed();
        if draft.full_path.is_empty() {
            return Err(Error::Validation("full path is required".into()));
        }

        let record = self.builder().backfill(&draft);
        self.transact(|engine, journal| journal.insert(&mut engine.catalog, record.clone()))?;
        debug!("manually added record {}", record.full_path);
        Ok(record)
    }

    /// Replace the record at `current_key` with `draft`, moving it to a new
    /// key when the draft's path differs. Returns the key the record ends up
    /// under.
    pub fn edit_single(&mut self, current_key: &str, draft: RecordDraft) -> Result<String> {
        if !self.catalog.contains_key(current_key) {
            return Err(Error::NotFound(current_key.to_string()));
        }

        let mut draft = draft.trimmed();
        let same_key = draft.full_path.is_empty() || draft.full_path == current_key;
        if same_key {
            draft.full_path = current_key.to_string();
        }

        let mut record = self.builder().backfill(&draft);
        if same_key {
            record.full_path = current_key.to_string();
        }
        let new_key = record.full_path.clone();

        self.transact(|engine, journal| {
            if new_key == current_key {
                journal.insert(&mut engine.catalog, record)
            } else {
                if engine.catalog.contains_key(&new_key) {
                    warn!("renaming {current_key} over existing entry {new_key}");
                }
                journal.rename(&mut engine.catalog, current_key, record)
            }
        })?;

        if new_key == current_key {
            debug!("saved record {current_key}");
        } else {
            info!("renamed record {current_key} -> {new_key}");
        }
        Ok(new_key)
    }

    /// Apply `patch` to every listed record. Unknown keys are reported, not
    /// fatal.
    pub fn edit_batch(&mut self, keys: &[String], patch: &RecordPatch) -> Result<BatchReport> {
        if patch.is_empty() {
            return Err(Error::Validation("no fields to apply".into()));
        }

        let mut report = BatchReport::default();
        self.transact(|engine, journal| {
            for key in keys {
                let Some(existing) = engine.catalog.get(key) else {
                    error!("batch edit: {key} not found");
                    report.failures.push((key.clone(), Error::NotFound(key.clone())));
                    continue;
                };
                let mut record = existing.clone();
                record.apply_patch(patch);
                journal.insert(&mut engine.catalog, record)?;
                report.updated += 1;
            }
            Ok(())
        })?;

        debug!("batch edit updated {} record(s)", report.updated);
        Ok(report)
    }

    /// Remove the listed keys; keys not in the catalog are ignored. Returns
    /// how many records were removed.
    pub fn delete(&mut self, keys: &[String]) -> Result<usize> {
        self.transact(|engine, journal| {
            let mut removed = 0;
            for key in keys {
                if journal.remove(&mut engine.catalog, key) {
                    debug!("deleted record {key}");
                    removed += 1;
                } else {
                    debug!("delete: {key} not in catalog");
                }
            }
            Ok(removed)
        })
    }

    /// Write catalog values into the files' embedded tags.
    pub fn push_tags(&self) -> SyncReport {
        sync::push_all(&self.catalog, &self.tags)
    }

    /// Start a sequential review over `keys`, positioned at `start`.
    pub fn navigator(&mut self, keys: Vec<String>, start: usize) -> Result<Navigator<'_, T>> {
        if let Some(missing) = keys.iter().find(|k| !self.catalog.contains_key(k.as_str())) {
            return Err(Error::NotFound(missing.clone()));
        }
        Navigator::new(self, keys, start)
    }

    fn transact<R>(
        &mut self,
        op: impl FnOnce(&mut Self, &mut Journal) -> Result<R>,
    ) -> Result<R> {
        let mut journal = Journal::default();
        match op(self, &mut journal) {
            Ok(value) => {
                self.commit(journal)?;
                Ok(value)
            }
            Err(e) => {
                self.rollback(journal);
                Err(e)
            }
        }
    }

    fn commit(&mut self, journal: Journal) -> Result<()> {
        if journal.prior.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.store.save(&self.catalog) {
            error!("{e}; reverting {} change(s)", journal.prior.len());
            self.rollback(journal);
            return Err(e);
        }
        Ok(())
    }

    fn rollback(&mut self, journal: Journal) {
        for (key, prior) in journal.prior.into_iter().rev() {
            self.catalog.restore(key, prior);
        }
    }
}
