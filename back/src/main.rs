use mint_back::{server, store, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load();

    // production logs go to collectors, not terminals
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(!config.is_production())
        .init();

    tracing::info!(
        deployment = ?config.deployment(),
        environment = %config.environment,
        "starting"
    );

    let store = store::open(&config).await?;
    server::run(config, store).await
}
