use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::library::{Column, RecordDraft, RecordPatch};

#[derive(Parser, Debug)]
#[command(name = "tunedex", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every record
    List {
        /// Column to sort by (default: artist)
        #[arg(long, value_parser = parse_column)]
        sort: Option<Column>,
        #[arg(long)]
        reverse: bool,
    },
    /// Case-insensitive search across all fields
    Search {
        term: String,
        #[arg(long, value_parser = parse_column)]
        sort: Option<Column>,
        #[arg(long)]
        reverse: bool,
    },
    /// Add or refresh a single audio file
    Add { path: PathBuf },
    /// Recursively add every supported file below a directory
    Import { dir: PathBuf },
    /// Add a record from explicit field values
    AddManual(FieldArgs),
    /// Edit one record; `--path` moves it to a new key
    Edit {
        key: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Step through records one at a time, reading commands from stdin
    Review {
        /// Records to review (default: the whole catalog, sorted by artist)
        keys: Vec<String>,
    },
    /// Set the same field values on several records
    EditBatch {
        #[arg(required = true)]
        keys: Vec<String>,
        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Remove records from the catalog (files are left alone)
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Write catalog values into the files' embedded tags
    Sync,
    /// Open records in the configured external player
    Play {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print the effective configuration
    Config,
}

/// Field values for manual add and single edit. Omitted flags stay blank
/// and are backfilled from the file.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub album: Option<String>,
    #[arg(long = "track")]
    pub track_number: Option<String>,
    #[arg(long = "size")]
    pub file_size: Option<String>,
    #[arg(long = "name")]
    pub file_name: Option<String>,
    #[arg(long = "path")]
    pub full_path: Option<String>,
}

impl FieldArgs {
    /// Overlay every supplied flag onto `draft`.
    pub fn apply_to(self, draft: &mut RecordDraft) {
        for (column, value) in [
            (Column::Artist, self.artist),
            (Column::Title, self.title),
            (Column::Album, self.album),
            (Column::TrackNumber, self.track_number),
            (Column::FileSize, self.file_size),
            (Column::FileName, self.file_name),
            (Column::FullPath, self.full_path),
        ] {
            if let Some(value) = value {
                *draft.field_mut(column) = value;
            }
        }
    }

    pub fn into_draft(self) -> RecordDraft {
        let mut draft = RecordDraft::default();
        self.apply_to(&mut draft);
        draft
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct PatchArgs {
    #[arg(long)]
    pub artist: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub album: Option<String>,
    #[arg(long = "track")]
    pub track_number: Option<String>,
}

impl From<PatchArgs> for RecordPatch {
    fn from(args: PatchArgs) -> Self {
        RecordPatch {
            artist: args.artist,
            title: args.title,
            album: args.album,
            track_number: args.track_number,
        }
    }
}

fn parse_column(s: &str) -> Result<Column, String> {
    Column::from_name(s).ok_or_else(|| {
        let names: Vec<_> = Column::ALL.iter().map(|c| c.name()).collect();
        format!("unknown column `{s}` (expected one of: {})", names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_accepts_column_aliases() {
        let cli = Cli::try_parse_from(["tunedex", "list", "--sort", "size", "--reverse"]).unwrap();
        match cli.command {
            Command::List { sort, reverse } => {
                assert_eq!(sort, Some(Column::FileSize));
                assert!(reverse);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        assert!(Cli::try_parse_from(["tunedex", "list", "--sort", "genre"]).is_err());
    }

    #[test]
    fn edit_flags_overlay_only_supplied_fields() {
        let cli = Cli::try_parse_from([
            "tunedex", "edit", "/m/a.mp3", "--artist", "Bowie", "--track", "4",
        ])
        .unwrap();
        let Command::Edit { key, fields } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(key, "/m/a.mp3");

        let mut draft = RecordDraft {
            title: "Kept".into(),
            full_path: "/m/a.mp3".into(),
            ..RecordDraft::default()
        };
        fields.apply_to(&mut draft);
        assert_eq!(draft.artist, "Bowie");
        assert_eq!(draft.track_number, "4");
        assert_eq!(draft.title, "Kept");
        assert_eq!(draft.full_path, "/m/a.mp3");
    }

    #[test]
    fn edit_batch_needs_keys_and_builds_a_sparse_patch() {
        assert!(Cli::try_parse_from(["tunedex", "edit-batch", "--album", "X"]).is_err());

        let cli =
            Cli::try_parse_from(["tunedex", "edit-batch", "/a.mp3", "/b.mp3", "--album", "X"])
                .unwrap();
        let Command::EditBatch { keys, patch } = cli.command else {
            panic!("expected edit-batch");
        };
        assert_eq!(keys, ["/a.mp3", "/b.mp3"]);
        let patch = RecordPatch::from(patch);
        assert_eq!(patch.album.as_deref(), Some("X"));
        assert!(patch.artist.is_none() && patch.title.is_none() && patch.track_number.is_none());
    }
}
