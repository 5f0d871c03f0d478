use std::error::Error as StdError;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::catalog::Catalog;
use crate::cli::Command;
use crate::config::{self, Settings};
use crate::engine::Engine;
use crate::error::Error;
use crate::library::{Column, Record, RecordDraft, display_label, display_row, normalize_path, path_key};
use crate::player;
use crate::tags::TagIo;

use super::review;

type CmdResult = Result<ExitCode, Box<dyn StdError>>;

const LIST_COLUMNS: [Column; 6] = [
    Column::Artist,
    Column::Title,
    Column::Album,
    Column::TrackNumber,
    Column::FileSize,
    Column::FullPath,
];

/// Accept either a catalog key as stored or any path that normalizes to one.
fn resolve_key(catalog: &Catalog, arg: &str) -> String {
    if catalog.contains_key(arg) {
        arg.to_string()
    } else {
        path_key(&normalize_path(Path::new(arg)))
    }
}

fn resolve_keys(catalog: &Catalog, args: &[String]) -> Vec<String> {
    args.iter().map(|a| resolve_key(catalog, a)).collect()
}

fn status(failures: &[(String, Error)]) -> ExitCode {
    if failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_failures<W: Write>(out: &mut W, failures: &[(String, Error)]) -> std::io::Result<()> {
    for (path, err) in failures {
        writeln!(out, "  failed: {path}: {err}")?;
    }
    Ok(())
}

fn print_records<W: Write>(out: &mut W, records: &[&Record]) -> std::io::Result<()> {
    let header: Vec<_> = LIST_COLUMNS.iter().map(|c| c.name()).collect();
    writeln!(out, "{}", header.join("\t"))?;
    for record in records {
        writeln!(out, "{}", display_row(record, &LIST_COLUMNS).join("\t"))?;
    }
    writeln!(out, "{} record(s)", records.len())
}

pub fn show_config<W: Write>(settings: &Settings, out: &mut W) -> CmdResult {
    match config::resolve_config_path() {
        Some(path) => writeln!(out, "# config file: {}", path.display())?,
        None => writeln!(out, "# no config file location")?,
    }
    write!(out, "{}", toml::to_string_pretty(settings)?)?;
    Ok(ExitCode::SUCCESS)
}

pub fn dispatch<T, R, W>(
    command: Command,
    engine: &mut Engine<T>,
    settings: &Settings,
    input: R,
    out: &mut W,
) -> CmdResult
where
    T: TagIo,
    R: BufRead,
    W: Write,
{
    match command {
        Command::List { sort, reverse } => {
            print_records(out, &engine.catalog().sorted(sort, reverse))?;
        }
        Command::Search {
            term,
            sort,
            reverse,
        } => {
            let hits = crate::catalog::sort_records(engine.catalog().search(&term), sort, reverse);
            print_records(out, &hits)?;
        }
        Command::Add { path } => {
            let record = engine.add_file(&path)?;
            writeln!(out, "added {} ({})", record.full_path, display_label(&record))?;
        }
        Command::Import { dir } => {
            let report = engine.import_directory(&dir)?;
            writeln!(
                out,
                "imported {}: {} added, {} skipped, {} failed, {} record(s) in catalog",
                dir.display(),
                report.added,
                report.skipped,
                report.failures.len(),
                engine.catalog().len()
            )?;
            print_failures(out, &report.failures)?;
            return Ok(status(&report.failures));
        }
        Command::AddManual(fields) => {
            let record = engine.add_manual(fields.into_draft())?;
            writeln!(out, "added {} ({})", record.full_path, display_label(&record))?;
        }
        Command::Edit { key, fields } => {
            let key = resolve_key(engine.catalog(), &key);
            let mut draft = match engine.catalog().get(&key) {
                Some(record) => RecordDraft::from_record(record),
                None => return Err(Error::NotFound(key).into()),
            };
            fields.apply_to(&mut draft);
            let new_key = engine.edit_single(&key, draft)?;
            if new_key == key {
                writeln!(out, "updated {key}")?;
            } else {
                writeln!(out, "moved {key} -> {new_key}")?;
            }
        }
        Command::Review { keys } => {
            let keys: Vec<String> = if keys.is_empty() {
                engine
                    .catalog()
                    .sorted(None, false)
                    .into_iter()
                    .map(|r| r.full_path.clone())
                    .collect()
            } else {
                resolve_keys(engine.catalog(), &keys)
            };
            let navigator = engine.navigator(keys, 0)?;
            review::run(navigator, input, out)?;
        }
        Command::EditBatch { keys, patch } => {
            let keys = resolve_keys(engine.catalog(), &keys);
            let report = engine.edit_batch(&keys, &patch.into())?;
            writeln!(
                out,
                "updated {} record(s), {} failed",
                report.updated,
                report.failures.len()
            )?;
            print_failures(out, &report.failures)?;
            return Ok(status(&report.failures));
        }
        Command::Delete { keys } => {
            let keys = resolve_keys(engine.catalog(), &keys);
            let removed = engine.delete(&keys)?;
            writeln!(out, "deleted {removed} record(s)")?;
        }
        Command::Sync => {
            let report = engine.push_tags();
            writeln!(
                out,
                "wrote tags to {} file(s), {} failed",
                report.updated,
                report.failures.len()
            )?;
            print_failures(out, &report.failures)?;
            return Ok(status(&report.failures));
        }
        Command::Play { keys } => {
            let mut paths = Vec::with_capacity(keys.len());
            for key in resolve_keys(engine.catalog(), &keys) {
                match engine.catalog().get(&key) {
                    Some(record) => paths.push(record.full_path.clone()),
                    None => return Err(Error::NotFound(key).into()),
                }
            }
            player::launch(&settings.player, &paths)?;
            writeln!(
                out,
                "playing {} file(s) with {}",
                paths.len(),
                settings.player.program
            )?;
        }
        Command::Config => return show_config(settings, out),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::cli::{FieldArgs, PatchArgs};
    use crate::tags::fake::MemoryTags;
    use std::fs;
    use std::io::Cursor;
    use tempfile::{TempDir, tempdir};

    struct Harness {
        dir: TempDir,
        settings: Settings,
        engine: Engine<MemoryTags>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let settings = Settings::default();
            let (engine, _) = Engine::open(
                CatalogStore::new(dir.path().join("catalog.json")),
                MemoryTags::default(),
                settings.library.clone(),
            )
            .unwrap();
            Self {
                dir,
                settings,
                engine,
            }
        }

        fn music(&self) -> std::path::PathBuf {
            self.dir.path().join("music")
        }

        fn song(&self, name: &str) -> String {
            fs::create_dir_all(self.music()).unwrap();
            let path = self.music().join(name);
            fs::write(&path, b"1").unwrap();
            path.to_string_lossy().into_owned()
        }

        fn run(&mut self, command: Command) -> (ExitCode, String) {
            let mut out = Vec::new();
            let code = dispatch(
                command,
                &mut self.engine,
                &self.settings,
                Cursor::new(""),
                &mut out,
            )
            .unwrap();
            (code, String::from_utf8(out).unwrap())
        }
    }

    #[test]
    fn import_then_list_and_search() {
        let mut h = Harness::new();
        h.song("one.mp3");
        h.song("two.flac");
        h.song("cover.png");

        let dir = h.music();
        let (code, out) = h.run(Command::Import { dir });
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("2 added, 1 skipped, 0 failed"));

        let (_, out) = h.run(Command::List {
            sort: None,
            reverse: false,
        });
        assert!(out.starts_with("artist\ttitle\talbum\ttracknumber\tfile_size\tfull_path\n"));
        assert!(out.ends_with("2 record(s)\n"));

        let (_, out) = h.run(Command::Search {
            term: "TWO".into(),
            sort: None,
            reverse: false,
        });
        assert!(out.contains("two.flac"));
        assert!(!out.contains("one.mp3"));
    }

    #[test]
    fn edit_keeps_unmentioned_fields() {
        let mut h = Harness::new();
        let song = h.song("song.mp3");
        h.run(Command::AddManual(FieldArgs {
            title: Some("Heroes".into()),
            full_path: Some(song.clone()),
            ..FieldArgs::default()
        }));

        let (_, out) = h.run(Command::Edit {
            key: song.clone(),
            fields: FieldArgs {
                artist: Some("Bowie".into()),
                ..FieldArgs::default()
            },
        });
        assert!(out.starts_with("updated "));

        let key = resolve_key(h.engine.catalog(), &song);
        let record = h.engine.catalog().get(&key).unwrap();
        assert_eq!(record.artist, "Bowie");
        assert_eq!(record.title, "Heroes");
    }

    #[test]
    fn batch_edit_with_missing_key_exits_non_zero() {
        let mut h = Harness::new();
        let song = h.song("song.mp3");
        h.run(Command::Add { path: song.clone().into() });

        let (code, out) = h.run(Command::EditBatch {
            keys: vec![song, "/nowhere/else.mp3".into()],
            patch: PatchArgs {
                album: Some("X".into()),
                ..PatchArgs::default()
            },
        });
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.contains("updated 1 record(s), 1 failed"));
        assert!(out.contains("/nowhere/else.mp3"));
    }

    #[test]
    fn delete_reports_count() {
        let mut h = Harness::new();
        let song = h.song("song.mp3");
        h.run(Command::Add { path: song.clone().into() });

        let (_, out) = h.run(Command::Delete {
            keys: vec![song, "/not/there.mp3".into()],
        });
        assert_eq!(out, "deleted 1 record(s)\n");
        assert!(h.engine.catalog().is_empty());
    }

    #[test]
    fn single_target_errors_propagate() {
        let mut h = Harness::new();
        let mut out = Vec::new();
        let err = dispatch(
            Command::Play {
                keys: vec!["/not/catalogued.mp3".into()],
            },
            &mut h.engine,
            &h.settings,
            Cursor::new(""),
            &mut out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no catalog entry"));
    }

    #[test]
    fn config_is_printed_as_toml() {
        let mut out = Vec::new();
        show_config(&Settings::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[library]"));
        assert!(text.contains("program = \"mpv\""));
    }
}
