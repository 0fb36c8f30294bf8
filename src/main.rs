use anyhow::Context;
use clap::Parser;
use airq_dashboard::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).context("airq-dashboard failed")
}
