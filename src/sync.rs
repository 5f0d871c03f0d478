//! One-way push of catalog values into the files' embedded tags.

use std::path::Path;

use log::{debug, error, info};

use crate::catalog::Catalog;
use crate::error::Error;
use crate::tags::TagIo;

#[derive(Debug, Default)]
pub struct SyncReport {
    pub updated: usize,
    pub failures: Vec<(String, Error)>,
}

/// Write every record's non-empty tag fields into its file.
///
/// Missing, unparseable or unwritable files are recorded in the report and
/// the pass moves on. The catalog is read-only here.
pub fn push_all(catalog: &Catalog, tags: &impl TagIo) -> SyncReport {
    let mut report = SyncReport::default();

    for record in catalog.records() {
        let path = Path::new(&record.full_path);
        if !path.is_file() {
            error!("file not found: {}", record.full_path);
            report.failures.push((
                record.full_path.clone(),
                Error::file_access(path, "file not found"),
            ));
            continue;
        }

        let fields = record.tag_fields();
        for (name, value) in fields.entries() {
            if !value.is_empty() {
                debug!("set {name}='{value}' for {}", record.full_path);
            }
        }

        match tags.write(path, &fields) {
            Ok(()) => report.updated += 1,
            Err(e) => {
                error!("error writing tags to {}: {e}", record.full_path);
                report.failures.push((record.full_path.clone(), e));
            }
        }
    }

    info!(
        "tags written to {} file(s), {} failure(s)",
        report.updated,
        report.failures.len()
    );
    report
}
