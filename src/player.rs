//! Hand a selection of catalog entries to an external player.

use std::process::{Child, Command, Stdio};

use log::info;

use crate::config::PlayerSettings;
use crate::error::{Error, Result};

/// Build the player command line for `paths` without starting it.
pub fn command(settings: &PlayerSettings, paths: &[String]) -> Result<Command> {
    if paths.is_empty() {
        return Err(Error::Validation("no files selected to play".into()));
    }

    let mut cmd = Command::new(&settings.program);
    cmd.args(&settings.args)
        .args(paths)
        .stdin(Stdio::null());
    Ok(cmd)
}

/// Start the player on `paths` and return without waiting for it.
pub fn launch(settings: &PlayerSettings, paths: &[String]) -> Result<Child> {
    let mut cmd = command(settings, paths)?;
    let child = cmd.spawn().map_err(|source| Error::PlayerLaunch {
        program: settings.program.clone(),
        source,
    })?;
    info!(
        "started {} (pid {}) with {} file(s)",
        settings.program,
        child.id(),
        paths.len()
    );
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(program: &str, args: &[&str]) -> PlayerSettings {
        PlayerSettings {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = launch(&PlayerSettings::default(), &[]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn configured_args_come_before_paths() {
        let cmd = command(
            &settings("mpv", &["--no-video", "--shuffle"]),
            &["/music/a.mp3".into(), "/music/b.flac".into()],
        )
        .unwrap();

        assert_eq!(cmd.get_program(), "mpv");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            ["--no-video", "--shuffle", "/music/a.mp3", "/music/b.flac"]
        );
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let err = launch(
            &settings("tunedex-no-such-player-binary", &[]),
            &["/music/a.mp3".into()],
        )
        .unwrap_err();
        match err {
            Error::PlayerLaunch { program, .. } => {
                assert_eq!(program, "tunedex-no-such-player-binary")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
