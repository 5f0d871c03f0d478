use std::fmt;

use super::Engine;
use crate::error::{Error, Result};
use crate::library::{Record, RecordDraft};
use crate::tags::TagIo;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Boundary {
    First,
    Last,
}

/// Result of a `previous`/`next` request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// Pending edits were committed and the cursor moved to this index.
    Moved(usize),
    /// Already at the edge; nothing was committed and the cursor stayed.
    AtBoundary(Boundary),
}

/// Cursor over an ordered list of catalog keys for one-at-a-time review.
///
/// Every move commits the edits for the current record first; a failed
/// commit leaves the cursor where it was. Record data is never held here,
/// all reads and writes go through the engine.
pub struct Navigator<'e, T> {
    engine: &'e mut Engine<T>,
    keys: Vec<String>,
    cursor: usize,
}

/// A `close` whose final commit failed. The navigator is handed back so the
/// edits can be corrected and retried.
pub struct CloseError<'e, T> {
    pub error: Error,
    pub navigator: Navigator<'e, T>,
}

impl<T> fmt::Debug for CloseError<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseError")
            .field("error", &self.error)
            .field("cursor", &self.navigator.cursor)
            .finish()
    }
}

impl<T> fmt::Display for CloseError<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<'e, T: TagIo> Navigator<'e, T> {
    pub(super) fn new(engine: &'e mut Engine<T>, keys: Vec<String>, start: usize) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::Validation("nothing to review".into()));
        }
        if start >= keys.len() {
            return Err(Error::Validation(format!(
                "start index {start} is past the last of {} record(s)",
                keys.len()
            )));
        }
        Ok(Self {
            engine,
            keys,
            cursor: start,
        })
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn current_key(&self) -> &str {
        &self.keys[self.cursor]
    }

    pub fn current(&self) -> Option<&Record> {
        self.engine.catalog().get(self.current_key())
    }

    /// Form state for the current record.
    pub fn draft(&self) -> RecordDraft {
        match self.current() {
            Some(record) => RecordDraft::from_record(record),
            None => RecordDraft {
                full_path: self.current_key().to_string(),
                ..RecordDraft::default()
            },
        }
    }

    /// Commit `draft` for the current record without moving. A changed path
    /// renames the entry and the key list follows it.
    pub fn save(&mut self, draft: RecordDraft) -> Result<()> {
        let new_key = self.engine.edit_single(&self.keys[self.cursor], draft)?;
        self.keys[self.cursor] = new_key;
        Ok(())
    }

    pub fn previous(&mut self, draft: RecordDraft) -> Result<Step> {
        if self.cursor == 0 {
            return Ok(Step::AtBoundary(Boundary::First));
        }
        self.save(draft)?;
        self.cursor -= 1;
        Ok(Step::Moved(self.cursor))
    }

    pub fn next(&mut self, draft: RecordDraft) -> Result<Step> {
        if self.cursor + 1 == self.keys.len() {
            return Ok(Step::AtBoundary(Boundary::Last));
        }
        self.save(draft)?;
        self.cursor += 1;
        Ok(Step::Moved(self.cursor))
    }

    /// Commit `draft` and end the review.
    pub fn close(mut self, draft: RecordDraft) -> std::result::Result<(), CloseError<'e, T>> {
        match self.save(draft) {
            Ok(()) => Ok(()),
            Err(error) => Err(CloseError {
                error,
                navigator: self,
            }),
        }
    }
}
