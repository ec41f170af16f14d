mod config;
mod controller;
mod export;
mod gui;
mod network;
mod style;
mod topology;

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, prelude::*};

use config::Cli;
use gui::app;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let (source, export) = match (cli.source_spec(), cli.export_settings()) {
        (Ok(source), Ok(export)) => (source, export),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(e) => {
            error!(error = %e, "Failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = app::main(rt, source, export) {
        error!(error = %e, "Window closed with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
