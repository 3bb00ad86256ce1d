mod cli;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashpop=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (addr, config) = match cli::run() {
        cli::RunOutcome::Serve { addr, config } => (addr, config),
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    };
    flashpop::serve(addr, config).await?;
    Ok(())
}
