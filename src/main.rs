use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::{info, trace};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sv::controller::Controller;
use sv::domain::{DEFAULT_SHEET_URL, SVConfig, SVError};
use sv::i18n::Locale;
use sv::loader::{HttpFetcher, Loader};
use sv::model::{Model, Status};
use sv::ui::TableUI;

/// View a published spreadsheet tab as a filterable table in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Spreadsheet url, e.g. https://docs.google.com/spreadsheets/d/<id>/edit?gid=0
    #[arg(default_value = DEFAULT_SHEET_URL)]
    url: String,

    /// Interface language
    #[arg(short, long, value_enum, default_value_t = Locale::En)]
    lang: Locale,

    /// Timeout for fetching the sheet, in seconds
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// Upper bound for the rendered width of a column
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Terminal event poll time in milliseconds
    #[arg(long = "poll", default_value_t = 100)]
    poll_ms: u64,

    /// Write logs to this file (filtered with RUST_LOG)
    #[arg(long)]
    log_file: Option<String>,
}

impl Args {
    fn to_config(&self) -> SVConfig {
        SVConfig::default()
            .source_url(self.url.clone())
            .locale(self.lang)
            .fetch_timeout(Duration::from_secs(self.timeout))
            .max_column_width(self.max_column_width)
            .event_poll_time(self.poll_ms)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = run(&args.to_config());
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(log_file: Option<&str>) -> Result<(), SVError> {
    // The terminal belongs to the ui, so logs only go to a file.
    let file_layer = match log_file {
        Some(path) => {
            let expanded = shellexpand::full(path)
                .map_err(|e| SVError::IoError(std::io::Error::other(e.to_string())))?;
            let path = PathBuf::from(expanded.into_owned());
            let file = File::create(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(config: &SVConfig) -> Result<(), SVError> {
    info!("Starting sv for {}", config.source_url);

    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let loader = Loader::new(Arc::new(fetcher));
    let controller = Controller::new(config);
    let mut ui = TableUI::new();

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(config, size.width as usize, size.height as usize);

    if let Some(request) = model.load(&config.source_url) {
        loader.spawn(request);
    }

    while model.status != Status::Quitting {
        while let Some(outcome) = loader.try_recv() {
            trace!("Load #{} finished", outcome.generation);
            model.finish_load(outcome);
        }

        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;

        if let Some(request) = model.take_load_request() {
            loader.spawn(request);
        }
    }

    info!("Quitting sv");
    Ok(())
}
