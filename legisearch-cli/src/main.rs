mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{evaluate, index, search};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;
    let data_dir = cli.data_dir;

    match cli.command {
        Command::Init(cmd) => {
            context::init(&data_dir, cmd.config.as_deref(), cmd.dimension)?;
            println!("Data directory created at {}.", data_dir.display());
            Ok(())
        }
        Command::Add(cmd) => index::add(cmd, &data_dir, format),
        Command::Backfill(cmd) => index::backfill(cmd, &data_dir, format),
        Command::Search(cmd) => search::run(cmd, &data_dir, format),
        Command::Stats => index::stats(&data_dir, format),
        Command::ModelInfo(cmd) => index::model_info(cmd, &data_dir, format),
        Command::Evaluate(cmd) => evaluate::run(cmd, &data_dir, format),
    }
}
