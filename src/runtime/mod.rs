use std::io;
use std::process::ExitCode;

use clap::Parser;

use crate::catalog::CatalogStore;
use crate::cli::{Cli, Command};
use crate::engine::Engine;
use crate::logger;
use crate::tags::LoftyTags;

mod commands;
mod review;
mod settings;

pub fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (settings, fallback) = settings::load_settings();

    if let Err(e) = logger::init(&settings.log) {
        eprintln!("tunedex: logging disabled: {e}");
    }
    if let Some(reason) = fallback {
        eprintln!("tunedex: {reason}; using defaults");
    }

    let mut stdout = io::stdout().lock();
    if let Command::Config = cli.command {
        return commands::show_config(&settings, &mut stdout);
    }

    let store = CatalogStore::new(&settings.store.path);
    let (mut engine, warning) = Engine::open(store, LoftyTags, settings.library.clone())?;
    if let Some(warning) = warning {
        eprintln!("tunedex: {warning}");
    }

    commands::dispatch(
        cli.command,
        &mut engine,
        &settings,
        io::stdin().lock(),
        &mut stdout,
    )
}
