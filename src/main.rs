use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use syspulse::backup::{self, BackupRequest};
use syspulse::cli::{CheckArgs, Cli, Commands};
use syspulse::display;
use syspulse::logger::RunLog;
use syspulse::probe::HostProbe;
use syspulse::runner::Runner;
use syspulse::{Config, PulseError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Check(args) => {
            args.apply(&mut config);
            config.validate().context("Invalid check options")?;
            return run_check(&config, &args).await;
        }
        Commands::Backup { dirs, dest, yes } => {
            let request = BackupRequest {
                dirs,
                destination: dest.unwrap_or_else(|| config.backup.destination.clone()),
                assume_yes: yes,
            };
            // backup is blocking file work
            let outcome = tokio::task::spawn_blocking(move || backup::run(&request))
                .await
                .context("Backup task panicked")?;
            match outcome {
                Ok(_) => {}
                Err(PulseError::Cancelled) => println!("{}", "Backup cancelled.".yellow()),
                Err(e) => return Err(anyhow::Error::new(e).context("Backup failed")),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_check(config: &Config, args: &CheckArgs) -> Result<ExitCode> {
    let probe = HostProbe::new(&config.probe);
    let mut log = if args.json {
        RunLog::quiet(&config.log_path)
    } else {
        RunLog::new(&config.log_path)
    };

    let mut runner = Runner::new(config, &probe);
    if args.json {
        runner = runner.quiet();
    }
    let summary = runner.run(&mut log).await;

    if args.json {
        display::show_report(&summary)?;
    } else {
        display::show_summary(&summary.results);
        if log.is_persisted() {
            println!("Log written to {}", log.path().display());
        }
    }
    Ok(summary.exit_code(args.strict))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "syspulse=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
