//! Gatekeeper - card-swipe door gate daemon.

use anyhow::Context;
use clap::Parser;
use gatekeeper_cli::{Cli, Config, Gate, logging, runtime};
use gatekeeper_directory::{AccountResolver, FreeIpaDirectory};
use gatekeeper_reader::AnyCardReader;
use gatekeeper_strike::AnyStrike;
use std::process::ExitCode;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match runtime::run_to_completion(run(cli)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: cannot start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if tracing::dispatcher::has_been_set() {
                error!(severity = "critical", "Gatekeeper stopped: {:#}", e);
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(&cli.config)?;
    cli.apply(&mut config);

    let log_file = config.logging.log.as_deref().map(logging::log_file_path);
    logging::init(log_file.as_deref(), cli.verbose)?;

    info!("Gatekeeper {} starting", gatekeeper_core::VERSION);
    info!("Configuration: {:?}", config);

    let reader = AnyCardReader::open(config.reader.mode, config.reader.device.as_deref())
        .await
        .context("card reader setup failed")?;

    let directory = FreeIpaDirectory::connect(config.credentials.to_freeipa())
        .await
        .context("directory login failed")?;
    let resolver = AccountResolver::new(directory, config.access.policy());

    let strike = AnyStrike::open(config.strike.method, &config.strike.settings())
        .await
        .context("door strike setup failed")?;

    let mut gate = Gate::new(reader, resolver, strike);
    gate.run(shutdown_signal()).await?;

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
