use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use jobpoll::cli::{Cli, Command, PollArgs, ServeArgs};
use jobpoll::config::JobpollConfig;
use jobpoll::simulator::{self, Simulator};
use jobpoll::ui::PollProgress;
use jobpoll::{PollingClient, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let mut config = JobpollConfig::load_from(cli.config.as_deref())?;

    match &cli.command {
        Command::Serve(args) => serve(&mut config, args).await,
        Command::Poll(args) => poll(&mut config, args).await,
    }
}

async fn serve(config: &mut JobpollConfig, args: &ServeArgs) -> Result<ExitCode> {
    args.apply(config);
    config.simulator.validate()?;

    let settings = &config.simulator;
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        completion_delay_ms = settings.completion_delay_ms,
        error_probability = settings.error_probability,
        "starting job simulator"
    );
    let simulator = Arc::new(Simulator::new(settings.simulator_config()));
    simulator::serve(listener, simulator).await?;
    Ok(ExitCode::SUCCESS)
}

async fn poll(config: &mut JobpollConfig, args: &PollArgs) -> Result<ExitCode> {
    args.apply(config);
    config.client.validate()?;

    let client = PollingClient::new(config.client.poll_config())?;
    let progress = PollProgress::start(&client.config().base_url);
    let result = client.get_status().await;
    progress.finish(&result);

    // `finish` already printed the failure line.
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
