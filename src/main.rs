use std::process::ExitCode;

mod catalog;
mod cli;
mod config;
mod engine;
mod error;
mod library;
mod logger;
mod player;
mod runtime;
mod sync;
mod tags;

fn main() -> ExitCode {
    match runtime::run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            eprintln!("tunedex: {e}");
            ExitCode::FAILURE
        }
    }
}
