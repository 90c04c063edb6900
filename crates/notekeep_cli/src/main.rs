//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notekeep_core` linkage and backend wiring from a terminal.
//! - Print the notes held by the selected backend after a first load.
//!
//! Usage: `notekeep_cli [backend] [config.json]`

use notekeep_core::{
    init_logging, ControllerError, DefaultStorageFactory, NotesConfig,
    NotesController, Route,
};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    println!("notekeep_core ping={}", notekeep_core::ping());
    println!("notekeep_core version={}", notekeep_core::core_version());

    let mut args = std::env::args().skip(1);
    let selector = args.next().unwrap_or_else(|| "relational".to_string());
    let config = match args.next() {
        Some(path) => match NotesConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => NotesConfig::default(),
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    match list_notes(&selector, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn list_notes(selector: &str, config: NotesConfig) -> Result<(), ControllerError> {
    let factory = Arc::new(DefaultStorageFactory::new(config.storage));
    let mut controller = NotesController::new(factory).await?;
    let Some(backend) = controller.select_backend(selector).await? else {
        println!("backend `{selector}` is not known; nothing to list");
        return Ok(());
    };

    let notes = controller.refresh().await?;
    println!("backend={backend} notes={} route={}", notes.len(), Route::List);
    for note in notes.iter() {
        let route = note
            .id
            .map_or_else(|| "-".to_string(), |note_id| Route::Detail { note_id }.path());
        println!("{route}\t{}\t{}", note.title, note.subtitle);
    }
    Ok(())
}
