use std::cmp::Ordering;

use super::Catalog;
use crate::library::{Column, Record};

impl Catalog {
    /// Records with any field containing `term`, case-insensitively. A blank
    /// term matches everything.
    pub fn search(&self, term: &str) -> Vec<&Record> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.records().collect();
        }
        self.records()
            .filter(|r| {
                Column::ALL
                    .iter()
                    .any(|&c| r.value(c).to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Every record ordered by `column`; artist order when `column` is `None`.
    pub fn sorted(&self, column: Option<Column>, reverse: bool) -> Vec<&Record> {
        sort_records(self.records().collect(), column, reverse)
    }
}

/// Text columns compare case-insensitively, `file_size` numerically. Ties
/// fall back to the path so the order is total.
pub fn sort_records(mut records: Vec<&Record>, column: Option<Column>, reverse: bool) -> Vec<&Record> {
    let column = column.unwrap_or(Column::Artist);
    records.sort_by(|a, b| {
        let ord = compare(a, b, column).then_with(|| a.full_path.cmp(&b.full_path));
        if reverse { ord.reverse() } else { ord }
    });
    records
}

fn compare(a: &Record, b: &Record, column: Column) -> Ordering {
    match column {
        Column::FileSize => a.file_size.cmp(&b.file_size),
        other => a
            .value(other)
            .to_lowercase()
            .cmp(&b.value(other).to_lowercase()),
    }
}
