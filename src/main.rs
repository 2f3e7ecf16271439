use clap::Parser;
use mimalloc::MiMalloc;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rm_catalog::app::AppContainer;
use rm_catalog::cli::{self, Cli};
use rm_catalog::config::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::load()?;
    cfg.offline |= cli.offline;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_level(true)
                .with_target(false),
        )
        .init();

    debug!(
        api = %cfg.api_base_url,
        database_url = %cfg.database_url,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        offline = cfg.offline,
        loglevel = %cfg.loglevel
    );

    let app = AppContainer::build(cfg).await?;
    let result = cli::run(cli, &app).await;
    app.shutdown().await;
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result.map_err(Into::into)
}
