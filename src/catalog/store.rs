use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;

use super::Catalog;
use crate::error::{Error, Result};
use crate::library::Record;

/// A freshly loaded catalog, plus a warning when the store was damaged and
/// had to be replaced by an empty catalog.
#[derive(Debug)]
pub struct Loaded {
    pub catalog: Catalog,
    pub warning: Option<String>,
}

/// JSON file holding the whole catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the catalog, creating an empty store first if none exists.
    ///
    /// Unparseable content yields an empty catalog with a warning; the damaged
    /// file is moved aside to `<name>.corrupt` so a later save cannot
    /// overwrite it.
    pub fn load(&self) -> Result<Loaded> {
        debug!("loading catalog from {}", self.path.display());

        if !self.path.exists() {
            if let Some(parent) = self.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::store_io(parent, e))?;
            }
            info!("{} does not exist, creating an empty catalog", self.path.display());
            self.save(&Catalog::default())?;
        }

        let bytes = fs::read(&self.path).map_err(|e| Error::store_io(&self.path, e))?;
        match serde_json::from_slice::<BTreeMap<String, Record>>(&bytes) {
            Ok(map) => {
                let (catalog, repaired) = Catalog::from_map(map);
                if repaired > 0 {
                    warn!("{repaired} catalog entries had a key/path mismatch and were repaired");
                }
                debug!("catalog loaded with {} record(s)", catalog.len());
                Ok(Loaded {
                    catalog,
                    warning: None,
                })
            }
            Err(e) => {
                let warning = match self.quarantine() {
                    Some(aside) => format!(
                        "catalog {} is unreadable ({e}); starting empty, damaged copy kept at {}",
                        self.path.display(),
                        aside.display()
                    ),
                    None => format!(
                        "catalog {} is unreadable ({e}); starting empty",
                        self.path.display()
                    ),
                };
                error!("{warning}");
                if !self.path.exists() {
                    self.save(&Catalog::default())?;
                }
                Ok(Loaded {
                    catalog: Catalog::default(),
                    warning: Some(warning),
                })
            }
        }
    }

    /// Replace the store with `catalog`. The new content is written to a
    /// sibling temp file and renamed into place, so a failed write leaves the
    /// previous store intact.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let dir = self.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::store_io(dir, e))?;

        write_pretty(&mut tmp, catalog).map_err(|e| Error::store_io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::store_io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::store_io(&self.path, e.error))?;

        debug!("catalog saved with {} record(s)", catalog.len());
        Ok(())
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn quarantine(&self) -> Option<PathBuf> {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".corrupt");
        let aside = PathBuf::from(name);
        match fs::rename(&self.path, &aside) {
            Ok(()) => Some(aside),
            Err(e) => {
                error!("cannot move damaged catalog aside: {e}");
                None
            }
        }
    }
}

/// Four-space indented JSON followed by a newline.
fn write_pretty(writer: impl Write, catalog: &Catalog) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    let mut ser = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    catalog.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
