use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{TagFields, TagIo};
use crate::error::{Error, Result};

/// In-memory `TagIo` for tests, keyed by canonical path.
#[derive(Default)]
pub(crate) struct MemoryTags {
    files: RefCell<HashMap<PathBuf, TagFields>>,
    unwritable: RefCell<HashSet<PathBuf>>,
}

fn key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl MemoryTags {
    pub(crate) fn with(self, path: &Path, fields: TagFields) -> Self {
        self.files.borrow_mut().insert(key(path), fields);
        self
    }

    pub(crate) fn fail_writes_to(self, path: &Path) -> Self {
        self.unwritable.borrow_mut().insert(key(path));
        self
    }

    pub(crate) fn get(&self, path: &Path) -> Option<TagFields> {
        self.files.borrow().get(&key(path)).cloned()
    }
}

impl TagIo for MemoryTags {
    fn read(&self, path: &Path) -> Option<TagFields> {
        self.get(path)
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<()> {
        let path = key(path);
        if self.unwritable.borrow().contains(&path) {
            return Err(Error::tag_io(path, "cannot write: read-only fixture"));
        }

        let mut files = self.files.borrow_mut();
        let stored = files.entry(path).or_default();
        for (target, value) in [
            (&mut stored.artist, &fields.artist),
            (&mut stored.title, &fields.title),
            (&mut stored.album, &fields.album),
            (&mut stored.track_number, &fields.track_number),
        ] {
            if !value.is_empty() {
                *target = value.clone();
            }
        }
        Ok(())
    }
}
