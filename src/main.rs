mod app;
mod components;
mod config;
mod editor;
mod error;
mod event;
mod fs;
mod handler;
mod logging;
mod note;
mod search;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::app::App;
use crate::config::{AppConfig, GeneralConfig, ThemeConfig};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::fs::operations::LocalFs;
use crate::tui::{install_panic_hook, Tui};

/// Browse a folder of markdown notes as a tree and study them section by section.
#[derive(Parser, Debug)]
#[command(name = "nt", version, about)]
struct Cli {
    /// Notes folder (defaults to [general] default_path, then the current directory)
    path: Option<PathBuf>,

    /// Configuration file, layered over the default locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Do not write a log file
    #[arg(long)]
    no_log: bool,

    /// Colour scheme: dark, light, or custom
    #[arg(long, value_name = "SCHEME")]
    theme: Option<String>,
}

impl Cli {
    /// Flags that override every config file.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: self.no_mouse.then_some(false),
                ..GeneralConfig::default()
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
                ..ThemeConfig::default()
            },
            ..AppConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if !cli.no_log {
        if let Err(e) = logging::init_logging(&config) {
            eprintln!("notetree: logging disabled: {}", e);
        }
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    let requested = cli
        .path
        .clone()
        .or_else(|| config.general.default_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = requested
        .canonicalize()
        .map_err(|_| AppError::InvalidPath(format!("{} does not exist", requested.display())))?;
    if !path.is_dir() {
        return Err(AppError::InvalidPath(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    info!(root = %path.display(), "starting notetree");

    let mut app = App::new(&path, &config, Arc::new(LocalFs))?;
    if let Some(first) = warnings.first() {
        app.set_error_message(first.clone());
    }

    install_panic_hook();
    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    app.set_event_sender(events.sender());
    app.sync_selected_note();

    loop {
        tui.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::NoteLoaded(loaded) => app.handle_note_loaded(loaded),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("exiting");
    Ok(())
}
