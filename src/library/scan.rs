use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::Error;

/// Result of walking a directory tree for audio files.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Supported audio files, in walk order.
    pub files: Vec<PathBuf>,
    /// Regular files whose extension is not in the configured set.
    pub skipped: usize,
    /// Entries the walker could not read.
    pub errors: Vec<(String, Error)>,
}

/// Lower-cased `.ext` suffixes for the configured extensions.
fn audio_suffixes(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .collect()
}

// Matched against the whole file name, so a file called just `.mp3` counts.
fn has_audio_suffix(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy().to_lowercase();
            suffixes.iter().any(|s| name.ends_with(s.as_str()))
        })
        .unwrap_or(false)
}

pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    has_audio_suffix(path, &audio_suffixes(settings))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Recursively collect the audio files below `dir`, at any depth.
///
/// Unreadable entries are collected in `errors` and the walk continues.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let suffixes = audio_suffixes(settings);

    let walker = WalkDir::new(dir).follow_links(settings.follow_links);

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dir.to_path_buf());
                warn!("cannot read {} during scan: {e}", path.display());
                outcome.errors.push((
                    path.display().to_string(),
                    Error::file_access(path, e),
                ));
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if has_audio_suffix(path, &suffixes) {
            debug!("found supported file: {}", path.display());
            outcome.files.push(path.to_path_buf());
        } else {
            debug!("ignoring unsupported file: {}", path.display());
            outcome.skipped += 1;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.Oga"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn is_audio_file_matches_the_whole_file_name() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/.FLAC"), &settings));
        assert!(is_audio_file(Path::new("/tmp/live.at.the.bbc.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/mp3"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.mp3.bak"), &settings));
        assert!(!is_audio_file(Path::new("/"), &settings));
    }

    #[test]
    fn scan_picks_up_files_named_only_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".mp3"), b"not real").unwrap();
        fs::write(dir.path().join("mp3"), b"not real").unwrap();

        let outcome = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(outcome.files, vec![dir.path().join(".mp3")]);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn is_audio_file_tolerates_dotted_extension_settings() {
        let settings = LibrarySettings {
            extensions: vec![".WAV".into(), "  ".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    }

    #[test]
    fn scan_recurses_to_any_depth_and_counts_unsupported() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();

        fs::write(dir.path().join("root.MP3"), b"not a real mp3").unwrap();
        fs::write(deep.join("deep.flac"), b"not a real flac").unwrap();
        fs::write(deep.join("cover.jpg"), b"ignore me").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

        let outcome = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.errors.is_empty());
        assert!(outcome.files.iter().any(|p| p.ends_with("a/b/c/deep.flac")));
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        let hidden_dir = dir.path().join(".cache");
        fs::create_dir_all(&hidden_dir).unwrap();
        fs::write(hidden_dir.join("inside.mp3"), b"not real").unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let outcome = scan(dir.path(), &settings);

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].ends_with("visible.mp3"));
    }

    #[test]
    fn scan_of_missing_root_reports_an_error() {
        let dir = tempdir().unwrap();
        let outcome = scan(&dir.path().join("nope"), &LibrarySettings::default());
        assert!(outcome.files.is_empty());
        assert_eq!(outcome.errors.len(), 1);
    }
}
