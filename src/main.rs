mod app;
mod config;
mod editor;
mod input;
mod logging;
mod parse_tree;
mod prompt;
mod syntax;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dim")]
#[command(author, version, about = "A small modal terminal text editor", long_about = None)]
struct Args {
    /// File to open
    path: Option<PathBuf>,

    /// Write a debug log to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Some(log_path) = &args.log {
        logging::init(log_path, &config.log_level)?;
    }
    if let Some(e) = &config_error {
        tracing::warn!("using default config: {:#}", e);
    }

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    if config_error.is_some() {
        app.set_status("Config file has errors, using defaults");
    }
    if let Some(path) = &args.path {
        app.open(path);
    }

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("fatal: {:#}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size().context("Failed to read window size")?;
        app.resize(size.width, size.height);

        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(input::Action::Quit) = input::handle_event(app)? {
            break;
        }
    }
    tracing::info!("exiting");
    Ok(())
}
