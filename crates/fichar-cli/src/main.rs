//! fichador: records Adrenalin HR attendance from the command line.
//!
//! ## Usage
//!
//! ```bash
//! fichador run                    # infer clock-in/out from the local hour
//! fichador run --mode clockin     # force the morning flow
//! fichador schedule               # daemon: fire at 9:00 and 19:00 daily
//! ```

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use fichar::{
    run_once, run_with_retries, AgentConfig, DailyScheduler, FicharResult, Mode, RetryPolicy,
    Schedule,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if dotenvy::dotenv().is_ok() {
        info!("loaded .env file");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fichador failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> FicharResult<()> {
    let config = Arc::new(AgentConfig::from_env()?);

    match cli.command {
        Commands::Run(args) => {
            let mode = args.mode.map(Mode::from);
            let outcome = run_with_retries(RetryPolicy::default(), |_attempt| {
                let config = Arc::clone(&config);
                async move { run_once(&config, mode).await }
            })
            .await?;
            info!(?outcome, "run finished");
            Ok(())
        }
        Commands::Schedule => schedule(config).await,
    }
}

async fn schedule(config: Arc<AgentConfig>) -> FicharResult<()> {
    let mut scheduler = DailyScheduler::new(Schedule::default());
    scheduler.start(move |mode| {
        let config = Arc::clone(&config);
        async move { run_once(&config, Some(mode)).await }
    });

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, letting any in-flight action finish");
    scheduler.shutdown().await;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
