use std::io::{BufRead, Write};

use crate::engine::{Boundary, CloseError, Navigator, Step};
use crate::library::{Column, RecordDraft};
use crate::tags::TagIo;

const HELP: &str =
    "commands: n(ext) p(revious) s(ave) c(lose) l(ist draft) q(uit without saving) field=value";

/// Drive a navigator from line commands on `input`.
///
/// `field=value` edits the pending draft; moving, saving and closing commit
/// it. End of input closes the review like `c`.
pub fn run<T, R, W>(
    navigator: Navigator<'_, T>,
    input: R,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: TagIo,
    R: BufRead,
    W: Write,
{
    let mut nav = navigator;
    let mut draft = nav.draft();
    let mut lines = input.lines();

    show(&nav, &draft, out)?;
    loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => {
                return match nav.close(draft) {
                    Ok(()) => Ok(()),
                    Err(CloseError { error, .. }) => Err(error.into()),
                };
            }
        };

        match line.trim() {
            "" => {}
            "?" | "h" | "help" => writeln!(out, "{HELP}")?,
            "l" | "list" => show(&nav, &draft, out)?,
            "q" | "quit" => {
                writeln!(out, "review ended, unsaved edits dropped")?;
                return Ok(());
            }
            "c" | "close" => match nav.close(draft.clone()) {
                Ok(()) => {
                    writeln!(out, "review closed")?;
                    return Ok(());
                }
                Err(CloseError { error, navigator }) => {
                    writeln!(out, "error: {error}")?;
                    nav = navigator;
                }
            },
            "s" | "save" => match nav.save(draft.clone()) {
                Ok(()) => {
                    draft = nav.draft();
                    writeln!(out, "saved")?;
                }
                Err(e) => writeln!(out, "error: {e}")?,
            },
            cmd @ ("n" | "next" | "p" | "prev" | "previous") => {
                let step = if cmd.starts_with('n') {
                    nav.next(draft.clone())
                } else {
                    nav.previous(draft.clone())
                };
                match step {
                    Ok(Step::Moved(_)) => {
                        draft = nav.draft();
                        show(&nav, &draft, out)?;
                    }
                    Ok(Step::AtBoundary(Boundary::First)) => {
                        writeln!(out, "already at the first record")?
                    }
                    Ok(Step::AtBoundary(Boundary::Last)) => {
                        writeln!(out, "already at the last record")?
                    }
                    Err(e) => writeln!(out, "error: {e}")?,
                }
            }
            other => match other.split_once('=') {
                Some((field, value)) => match Column::from_name(field) {
                    Some(column) => *draft.field_mut(column) = value.trim().to_string(),
                    None => writeln!(out, "unknown field `{}`", field.trim())?,
                },
                None => writeln!(out, "unknown command `{other}` ({HELP})")?,
            },
        }
    }
}

fn show<T: TagIo, W: Write>(
    nav: &Navigator<'_, T>,
    draft: &RecordDraft,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "[{}/{}] {}", nav.position() + 1, nav.len(), nav.current_key())?;
    for column in Column::ALL {
        let value = match column {
            Column::Artist => &draft.artist,
            Column::Title => &draft.title,
            Column::Album => &draft.album,
            Column::TrackNumber => &draft.track_number,
            Column::FileSize => &draft.file_size,
            Column::FileName => &draft.file_name,
            Column::FullPath => &draft.full_path,
        };
        writeln!(out, "  {:<12} {value}", column.name())?;
    }
    Ok(())
}
