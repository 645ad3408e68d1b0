use std::{fs::File, io::stdout, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use pdfnotes::document::PdfDocument;
use pdfnotes::event_source::KeyboardEventSource;
use pdfnotes::panic_handler::{initialize_panic_handler, restore_terminal};
use pdfnotes::settings::{get_settings, load_settings};
use pdfnotes::{App, run_app_with_event_source};

/// Read a PDF in the terminal, highlight passages and attach notes to them
#[derive(Parser, Debug)]
#[command(name = "pdfnotes", version, about)]
struct Args {
    /// PDF file to open
    file: PathBuf,

    /// Where to write the log
    #[arg(long, default_value = "pdfnotes.log")]
    log_file: PathBuf,

    /// Settings file to use instead of the default config location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("Cannot create log file {}", args.log_file.display()))?,
    )?;

    info!("Starting pdfnotes");

    load_settings(args.config.as_deref());
    let settings = get_settings();

    let document = PdfDocument::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    initialize_panic_handler();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(document, &settings);
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!(
        "Shutting down pdfnotes with {} notes",
        app.annotations.state().len()
    );
    Ok(())
}
