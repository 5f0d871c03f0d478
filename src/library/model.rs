use serde::{Deserialize, Deserializer, Serialize};

use crate::tags::TagFields;

/// One catalog entry: the tag fields of an audio file plus filesystem facts.
///
/// `full_path` doubles as the record's key in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub artist: String,
    pub title: String,
    pub album: String,
    /// Kept as text: source tags frequently carry values like `3/12` or `A1`.
    #[serde(rename = "tracknumber")]
    pub track_number: String,
    #[serde(deserialize_with = "lenient_size")]
    pub file_size: u64,
    pub file_name: String,
    pub full_path: String,
}

impl Record {
    pub fn tag_fields(&self) -> TagFields {
        TagFields {
            artist: self.artist.clone(),
            title: self.title.clone(),
            album: self.album.clone(),
            track_number: self.track_number.clone(),
        }
    }

    /// Overwrite only the fields set in `patch`.
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        if let Some(v) = &patch.artist {
            self.artist = v.clone();
        }
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = &patch.album {
            self.album = v.clone();
        }
        if let Some(v) = &patch.track_number {
            self.track_number = v.clone();
        }
    }

    /// Text value of a column, as shown in listings and matched by search.
    pub fn value(&self, column: Column) -> String {
        match column {
            Column::Artist => self.artist.clone(),
            Column::Title => self.title.clone(),
            Column::Album => self.album.clone(),
            Column::TrackNumber => self.track_number.clone(),
            Column::FileSize => self.file_size.to_string(),
            Column::FileName => self.file_name.clone(),
            Column::FullPath => self.full_path.clone(),
        }
    }
}

/// Accepts the integer sizes this crate writes as well as the numeric (or
/// blank) strings older stores contain.
fn lenient_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Size>::deserialize(deserializer)? {
        Some(Size::Number(n)) => n,
        Some(Size::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

/// String-typed field set as entered by a caller (form, command line).
///
/// Empty fields mean "not supplied" and are subject to backfill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub track_number: String,
    pub file_size: String,
    pub file_name: String,
    pub full_path: String,
}

impl RecordDraft {
    pub fn from_record(record: &Record) -> Self {
        Self {
            artist: record.artist.clone(),
            title: record.title.clone(),
            album: record.album.clone(),
            track_number: record.track_number.clone(),
            file_size: record.file_size.to_string(),
            file_name: record.file_name.clone(),
            full_path: record.full_path.clone(),
        }
    }

    pub fn field_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Artist => &mut self.artist,
            Column::Title => &mut self.title,
            Column::Album => &mut self.album,
            Column::TrackNumber => &mut self.track_number,
            Column::FileSize => &mut self.file_size,
            Column::FileName => &mut self.file_name,
            Column::FullPath => &mut self.full_path,
        }
    }

    /// Strip surrounding whitespace from every field.
    pub fn trimmed(mut self) -> Self {
        for column in Column::ALL {
            let field = self.field_mut(column);
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }
}

/// Sparse overrides for a multi-record edit: `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.title.is_none()
            && self.album.is_none()
            && self.track_number.is_none()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Column {
    Artist,
    Title,
    Album,
    TrackNumber,
    FileSize,
    FileName,
    FullPath,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Artist,
        Column::Title,
        Column::Album,
        Column::TrackNumber,
        Column::FileSize,
        Column::FileName,
        Column::FullPath,
    ];

    /// Field name as used in the store and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Column::Artist => "artist",
            Column::Title => "title",
            Column::Album => "album",
            Column::TrackNumber => "tracknumber",
            Column::FileSize => "file_size",
            Column::FileName => "file_name",
            Column::FullPath => "full_path",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "track" | "track_number" => return Some(Column::TrackNumber),
            "size" => return Some(Column::FileSize),
            "name" => return Some(Column::FileName),
            "path" => return Some(Column::FullPath),
            _ => {}
        }
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}
