use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::{TemperatureCategory, View};
use crate::writers::ExportFormat;

#[derive(Parser)]
#[command(name = "airq-dashboard")]
#[command(about = "Explore hourly PM10 and weather data from the Dongsi and Wanliu stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: airq.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarise the dataset: stations, time range, missing values, integrity
    Overview {
        #[arg(short, long, help = "Input CSV or zip archive [default: data.path setting]")]
        data: Option<PathBuf>,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },

    /// Render one analysis view
    View {
        #[arg(value_parser = parse_view, help = "daily-pattern, weather-effects, further-analysis or conclusion")]
        view: View,

        #[arg(short, long, help = "Input CSV or zip archive [default: data.path setting]")]
        data: Option<PathBuf>,

        #[arg(short, long)]
        station: Option<String>,

        #[arg(long, value_parser = parse_category, help = "cold, cool, mild or warm")]
        category: Option<TemperatureCategory>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(long, help = "Omit the narrative insights")]
        no_insights: bool,
    },

    /// Interactive session: switch views and filters from stdin
    Explore {
        #[arg(short, long, help = "Input CSV or zip archive [default: data.path setting]")]
        data: Option<PathBuf>,
    },

    /// Write the tables behind a view to CSV or JSON
    Export {
        #[arg(value_parser = parse_view)]
        view: View,

        #[arg(short, long, help = "Input CSV or zip archive [default: data.path setting]")]
        data: Option<PathBuf>,

        #[arg(short, long)]
        station: Option<String>,

        #[arg(long, value_parser = parse_category)]
        category: Option<TemperatureCategory>,

        #[arg(
            short,
            long,
            value_parser = parse_export_format,
            help = "csv or json [default: from the output extension, else csv]"
        )]
        format: Option<ExportFormat>,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/airq-{view}-{YYMMDD}.{ext}]"
        )]
        output: Option<PathBuf>,
    },
}

fn parse_view(s: &str) -> Result<View, String> {
    s.parse().map_err(|e: crate::error::AnalysisError| e.to_string())
}

fn parse_category(s: &str) -> Result<TemperatureCategory, String> {
    s.parse().map_err(|e: crate::error::AnalysisError| e.to_string())
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: crate::error::AnalysisError| e.to_string())
}
