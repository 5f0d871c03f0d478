use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use log::{Level, LevelFilter, Metadata, Record};

use crate::config::LogSettings;

/// Writes to stderr, or to a pair of dated files when a log directory is
/// configured: a debug file with everything and an error file with errors
/// only.
struct CatalogLogger {
    level: LevelFilter,
    files: Option<LogFiles>,
}

struct LogFiles {
    debug: Mutex<File>,
    error: Mutex<File>,
}

impl log::Log for CatalogLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string(), record);
        match &self.files {
            Some(files) => {
                append(&files.debug, &line);
                if record.level() == Level::Error {
                    append(&files.error, &line);
                }
            }
            None => eprintln!("{line}"),
        }
    }

    fn flush(&self) {
        if let Some(files) = &self.files {
            for file in [&files.debug, &files.error] {
                if let Ok(mut f) = file.lock() {
                    let _ = f.flush();
                }
            }
        }
    }
}

// A failing log write must never take the operation down with it.
fn append(file: &Mutex<File>, line: &str) {
    match file.lock() {
        Ok(mut f) => {
            if let Err(e) = writeln!(f, "{line}") {
                eprintln!("tunedex: failed to write log: {e}");
            }
        }
        Err(_) => eprintln!("{line}"),
    }
}

fn format_line(timestamp: &str, record: &Record) -> String {
    format!("{timestamp} - {} - {}", record.level(), record.args())
}

/// `(debug, error)` log file paths for `date` inside `dir`.
pub fn log_file_paths(dir: &Path, date: NaiveDate) -> (PathBuf, PathBuf) {
    let day = date.format("%Y-%m-%d");
    (
        dir.join(format!("tunedex-debug-{day}.log")),
        dir.join(format!("tunedex-error-{day}.log")),
    )
}

fn open_append(path: &Path) -> std::io::Result<Mutex<File>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Mutex::new)
}

fn build(settings: &LogSettings) -> Result<CatalogLogger, Box<dyn std::error::Error>> {
    let level = LevelFilter::from_str(&settings.level)?;
    let files = match &settings.dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let (debug, error) = log_file_paths(dir, Local::now().date_naive());
            Some(LogFiles {
                debug: open_append(&debug)?,
                error: open_append(&error)?,
            })
        }
        None => None,
    };
    Ok(CatalogLogger { level, files })
}

pub fn init(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    let logger = build(settings)?;
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger)).map(|()| log::set_max_level(level))?;
    Ok(())
}
