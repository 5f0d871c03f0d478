//! Audio file records: the record model, directory scanning and the builder
//! that merges caller input with embedded tags and filesystem facts.

mod builder;
mod display;
mod model;
mod scan;

pub use builder::{RecordBuilder, normalize_path, path_key};
pub use display::{display_label, display_row, format_size};
pub use model::{Column, Record, RecordDraft, RecordPatch};
pub use scan::{ScanOutcome, is_audio_file, scan};
