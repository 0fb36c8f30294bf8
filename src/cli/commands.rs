use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analyzers::DatasetAnalyzer;
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::cli::explore::explore;
use crate::cli::render::Renderer;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::models::{TemperatureCategory, View, ViewSelection};
use crate::processors::IntegrityChecker;
use crate::readers::open_source;
use crate::settings::Settings;
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ExportFormat, TableWriter};

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())?;
    info!("Settings: {:?}", settings);

    match cli.command {
        Commands::Overview { data, sample } => {
            let path = data_path(data, &settings);
            println!("Analyzing dataset: {}", path.display());

            let progress = ProgressReporter::new_spinner("Loading data...", false);
            let dataset = open_source(&path, settings.data.use_mmap, &settings.data.stations).load()?;
            progress.finish_and_clear();

            let overview = DatasetAnalyzer::new().analyze(&dataset)?;
            println!("\n{}", overview.detailed_summary());

            let checker = IntegrityChecker::new();
            let report = checker.check_integrity(&dataset);
            println!("\n{}", checker.generate_summary(&report));

            if sample > 0 {
                println!("Sample Records (showing {} records):", sample);
                for (i, record) in dataset.records().iter().take(sample).enumerate() {
                    println!(
                        "{}. {} at {}: PM10={}, TEMP={}, DEWP={}, PRES={}",
                        i + 1,
                        record.station,
                        record.timestamp,
                        show(record.pm10),
                        show(record.temp),
                        show(record.dewp),
                        show(record.pres)
                    );
                }
            }
        }

        Commands::View {
            view,
            data,
            station,
            category,
            format,
            no_insights,
        } => {
            let mut dashboard = open_dashboard(data, &settings)?;
            let selection = selection(view, station, category);
            let output = dashboard.resolve(selection)?;

            match format {
                OutputFormat::Text => {
                    let renderer = Renderer::new()
                        .with_precision(settings.output.precision)
                        .with_insights(!no_insights);
                    println!("{}", renderer.render(output));
                }
                OutputFormat::Json => println!("{}", Renderer::new().render_json(output)?),
            }
        }

        Commands::Explore { data } => {
            let mut dashboard = open_dashboard(data, &settings)?;
            let renderer = Renderer::new().with_precision(settings.output.precision);

            let stdin = io::stdin();
            explore(&mut dashboard, &renderer, stdin.lock(), io::stdout())?;
            info!("Session closed after {} distinct views", dashboard.cached_views());
        }

        Commands::Export {
            view,
            data,
            station,
            category,
            format,
            output,
        } => {
            let mut dashboard = open_dashboard(data, &settings)?;
            let resolved = dashboard.resolve(selection(view, station, category))?;

            let format = format
                .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
                .unwrap_or_default();
            let output_file = output
                .unwrap_or_else(|| generate_default_export_filename(view.slug(), format.extension()));

            if ExportFormat::from_path(&output_file).is_some_and(|f| f != format) {
                warn!(
                    "Writing {} to {} despite its extension",
                    format.extension(),
                    output_file.display()
                );
            }

            let rows = TableWriter::with_format(format).write_output(resolved, &output_file)?;
            match format {
                ExportFormat::Csv => println!("Wrote {} rows to {}", rows, output_file.display()),
                ExportFormat::Json => println!("Wrote {}", output_file.display()),
            }
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`.
/// An already installed subscriber is kept.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
    };
    if let Err(e) = installed {
        debug!("Keeping existing subscriber: {}", e);
    }

    Ok(())
}

fn data_path(data: Option<PathBuf>, settings: &Settings) -> PathBuf {
    data.unwrap_or_else(|| settings.data.path.clone())
}

fn open_dashboard(data: Option<PathBuf>, settings: &Settings) -> Result<Dashboard> {
    let path = data_path(data, settings);
    let source = open_source(&path, settings.data.use_mmap, &settings.data.stations);
    let progress = ProgressReporter::new_spinner("Loading data...", false);
    Dashboard::open(source.as_ref(), settings, &progress)
}

fn selection(view: View, station: Option<String>, category: Option<TemperatureCategory>) -> ViewSelection {
    let mut selection = ViewSelection::new(view);
    selection.station = station;
    selection.category = category;
    selection
}

fn show(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string())
}
