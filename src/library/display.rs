use super::model::{Column, Record};

const MIB: f64 = 1024.0 * 1024.0;

/// Render a byte count the way listings show it (`4.20 MB`).
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB)
}

/// Build the display cells of a record for the given `columns`.
///
/// `file_size` is humanized; every other column is shown verbatim.
pub fn display_row(record: &Record, columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .map(|&c| match c {
            Column::FileSize => format_size(record.file_size),
            other => record.value(other),
        })
        .collect()
}

/// One-line summary used in command output: `Artist - Title`, falling back to
/// the file name when both are blank.
pub fn display_label(record: &Record) -> String {
    let parts: Vec<&str> = [record.artist.trim(), record.title.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        record.file_name.clone()
    } else {
        parts.join(" - ")
    }
}
