//! Embedded tag access.
//!
//! Only four fields are tracked (artist, title, album, track number). The
//! `TagIo` trait is the seam between the catalog engine and the audio files;
//! `LoftyTags` is the implementation backed by `lofty`.

use std::borrow::Cow;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use log::debug;

use crate::error::{Error, Result};

#[cfg(test)]
pub(crate) mod fake;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub track_number: String,
}

impl TagFields {
    /// `(name, value)` pairs using the common lower-case tag vocabulary.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("artist", self.artist.as_str()),
            ("title", self.title.as_str()),
            ("album", self.album.as_str()),
            ("tracknumber", self.track_number.as_str()),
        ]
    }
}

pub trait TagIo {
    /// Tags embedded in `path`, or `None` when the file has none or cannot be
    /// parsed.
    fn read(&self, path: &Path) -> Option<TagFields>;

    /// Store every non-empty field of `fields` in the file's tag. Empty
    /// fields leave the existing tag value alone.
    fn write(&self, path: &Path, fields: &TagFields) -> Result<()>;
}

/// `TagIo` over the `lofty` tag library.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTags;

impl TagIo for LoftyTags {
    fn read(&self, path: &Path) -> Option<TagFields> {
        let tagged = match Probe::open(path).and_then(|p| p.read()) {
            Ok(tagged) => tagged,
            Err(e) => {
                debug!("cannot read tags of {}: {e}", path.display());
                return None;
            }
        };

        let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
        Some(TagFields {
            artist: text(tag.artist()),
            title: text(tag.title()),
            album: text(tag.album()),
            track_number: track_number(tag),
        })
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<()> {
        let mut tagged = Probe::open(path)
            .and_then(|p| p.read())
            .map_err(|e| Error::tag_io(path, format!("cannot open: {e}")))?;

        let tag_type = tagged.primary_tag_type();
        if tagged.tag(tag_type).is_none() {
            tagged.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged
            .tag_mut(tag_type)
            .ok_or_else(|| Error::tag_io(path, format!("{tag_type:?} tags are not supported")))?;

        if !fields.artist.is_empty() {
            tag.set_artist(fields.artist.clone());
        }
        if !fields.title.is_empty() {
            tag.set_title(fields.title.clone());
        }
        if !fields.album.is_empty() {
            tag.set_album(fields.album.clone());
        }
        if !fields.track_number.is_empty() {
            tag.insert_text(ItemKey::TrackNumber, fields.track_number.clone());
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::tag_io(path, format!("cannot write: {e}")))
    }
}

fn text(value: Option<Cow<'_, str>>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

// The raw item keeps values such as "3/12"; the accessor only yields numbers.
fn track_number(tag: &Tag) -> String {
    tag.items()
        .find(|item| matches!(item.key(), ItemKey::TrackNumber))
        .and_then(|item| item.value().text())
        .map(|v| v.trim().to_string())
        .or_else(|| tag.track().map(|n| n.to_string()))
        .unwrap_or_default()
}
