//! Beacon CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use beacon_cli::cli::{Cli, Commands, LogFormat};
use beacon_cli::commands::{ConfigCommand, DashboardCommand, RunAllCommand, RunCommand, resolve_config};
use beacon_cli::output::OutputFormat;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr);
    match log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::new(cli.format);
    let config = resolve_config(cli.config.as_deref(), cli.data_dir)?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Run { domain } => {
            let cmd = RunCommand::new(config);
            cmd.execute(&mut stdout, &format, domain.into())?;
        }
        Commands::RunAll => {
            let cmd = RunAllCommand::new(config);
            cmd.execute(&mut stdout, &format)?;
        }
        Commands::Dashboard(args) => {
            let cmd = DashboardCommand::new(config);
            cmd.execute(&mut stdout, &format, &args)?;
        }
        Commands::Config => {
            let cmd = ConfigCommand::new(config);
            cmd.execute(&mut stdout, &format)?;
        }
    }

    Ok(())
}
