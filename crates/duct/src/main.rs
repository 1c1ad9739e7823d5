mod cli;
mod orchestrator;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // DUCT_LOG_LEVEL is this crate's log-level knob; RUST_LOG (tracing's own
    // convention) still wins if both happen to be set, since EnvFilter checks
    // it first.
    let filter = match std::env::var("DUCT_LOG_LEVEL") {
        Ok(level) if std::env::var("RUST_LOG").is_err() => {
            tracing_subscriber::EnvFilter::try_new(level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        }
        _ => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let cli = cli::Cli::parse();
    let config = cli.into_config();

    let exit_code = orchestrator::run(config).await?;
    std::process::exit(exit_code);
}
