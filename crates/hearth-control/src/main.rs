//! hearth - room control program on a mock device bench
//!
//! Reads console commands from stdin (`help` lists them), prints lines
//! assembled from the receive port, and stops on `stop`, end of input or
//! Ctrl-C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hearth_control::{ConsoleCommand, ControlConfig, LoopbackBench, ProgramStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Room control program for keypad, serial, IR and audio devices")]
#[command(version)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ControlConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ControlConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (system, _bench) = LoopbackBench::build(config)?;
    let mut handle = system.start().await?;
    info!("Ready, type 'help' for commands");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            input = stdin.next_line() => {
                let Some(input) = input.context("reading stdin")? else {
                    info!("End of input");
                    break;
                };
                if input.trim().is_empty() {
                    continue;
                }
                match input.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Help) => println!("{}", ConsoleCommand::HELP),
                    Ok(ConsoleCommand::Program(ProgramStatus::Stopping)) => break,
                    Ok(command) => {
                        if let Err(e) = handle.execute(command).await {
                            warn!("{}", e);
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
            Some(line) = handle.recv_line() => {
                println!("{}", line);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    let report = handle.shutdown().await?;
    info!(
        "Stopped: {} line(s) received, {} fault(s), {} handler error(s)",
        report.lines_emitted, report.faults, report.handler_errors
    );
    Ok(())
}
