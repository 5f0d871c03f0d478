use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::config::LibrarySettings;
use crate::error::{Error, Result};
use crate::tags::{TagFields, TagIo};

use super::model::{Record, RecordDraft};
use super::scan::is_audio_file;

/// Absolute form of `path`: canonical when the file exists, otherwise
/// joined onto the working directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Catalog key of a path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Assembles records from caller input, embedded tags and filesystem facts.
///
/// Per metadata field the first non-empty source wins: caller input, then
/// the file's tags, then the empty string.
pub struct RecordBuilder<'a> {
    tags: &'a dyn TagIo,
    settings: &'a LibrarySettings,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(tags: &'a dyn TagIo, settings: &'a LibrarySettings) -> Self {
        Self { tags, settings }
    }

    /// Build a record for an existing, supported audio file.
    ///
    /// Fails without producing anything when the extension is unsupported or
    /// the file cannot be stat'ed. Unreadable tags are not an error.
    pub fn build(&self, path: &Path, user: Option<&RecordDraft>) -> Result<Record> {
        if !is_audio_file(path, self.settings) {
            return Err(Error::UnsupportedFormat(path.to_path_buf()));
        }
        let meta = fs::metadata(path).map_err(|e| Error::file_access(path, e))?;
        if !meta.is_file() {
            return Err(Error::file_access(path, "not a regular file"));
        }

        // Keys are UTF-8; a lossy key would name a file that does not exist.
        let full_path = normalize_path(path);
        if full_path.to_str().is_none() {
            return Err(Error::file_access(path, "path is not valid UTF-8"));
        }
        let tags = self.read_tags(&full_path);
        let empty = RecordDraft::default();
        let user = user.unwrap_or(&empty);

        let name = base_name(&full_path);

        Ok(merge(user, &tags, &full_path, name, || Some(meta.len())))
    }

    /// Complete a caller-supplied draft.
    ///
    /// Only drafts whose path carries a supported extension are backfilled;
    /// the file does not have to exist. `draft.full_path` must be non-empty.
    pub fn backfill(&self, draft: &RecordDraft) -> Record {
        let full_path = normalize_path(Path::new(&draft.full_path));

        if !is_audio_file(&full_path, self.settings) {
            debug!("no backfill for unsupported path {}", full_path.display());
            return merge(draft, &TagFields::default(), &full_path, String::new(), || None);
        }

        let tags = self.read_tags(&full_path);
        let name = base_name(&full_path);
        merge(draft, &tags, &full_path, name, || match fs::metadata(&full_path) {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                error!("cannot read size of {}: {e}", full_path.display());
                None
            }
        })
    }

    fn read_tags(&self, path: &Path) -> TagFields {
        match self.tags.read(path) {
            Some(tags) => tags,
            None => {
                debug!("no tags found in {}", path.display());
                TagFields::default()
            }
        }
    }
}

fn pick(user: &str, tag: &str) -> String {
    if user.is_empty() {
        tag.to_string()
    } else {
        user.to_string()
    }
}

fn merge(
    user: &RecordDraft,
    tags: &TagFields,
    full_path: &Path,
    fallback_name: String,
    fs_size: impl FnOnce() -> Option<u64>,
) -> Record {
    let file_size = match user.file_size.trim().parse::<u64>() {
        Ok(size) => size,
        Err(_) => fs_size().unwrap_or(0),
    };

    Record {
        artist: pick(&user.artist, &tags.artist),
        title: pick(&user.title, &tags.title),
        album: pick(&user.album, &tags.album),
        track_number: pick(&user.track_number, &tags.track_number),
        file_size,
        file_name: pick(&user.file_name, &fallback_name),
        full_path: path_key(full_path),
    }
}
