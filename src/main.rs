use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use tubefeed::feed::{
    start_feed_updater, AtomRenderer, ChannelFeedPoller, CycleOptions, FeedService,
};
use tubefeed::store::SqliteStore;
use tubefeed::web::WebServer;
use tubefeed::youtube::{YoutubeApi, YoutubeClient};
use tubefeed::{Config, Database};

const CONFIG_ENV: &str = "TUBEFEED_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn load_config() -> Config {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        eprintln!("{path} not found, using default configuration.");
        let mut config = Config::default();
        config.apply_env_overrides();
        return config;
    }

    match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(config: Config) -> tubefeed::Result<()> {
    let db = Database::open(&config.database.path).await?;
    let store = Arc::new(SqliteStore::new(db));

    let client = Arc::new(YoutubeClient::new(&config.youtube)?);
    let api = Arc::new(YoutubeApi::from_config(client, &config.youtube));
    let poller = Arc::new(ChannelFeedPoller::new(&config.feed)?);
    let renderer = Arc::new(AtomRenderer::new(&config.output));

    let service = Arc::new(FeedService::new(
        store,
        api,
        poller,
        renderer,
        CycleOptions::from_config(&config),
    ));

    if config.feed.refresh_interval_secs > 0 {
        start_feed_updater(service.clone(), config.feed.refresh_interval_secs);
        info!(
            "Background refresh every {} seconds",
            config.feed.refresh_interval_secs
        );
    }

    let server = WebServer::new(&config.server, service)?;
    server.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = load_config();

    // Initialize logging
    if let Err(e) = tubefeed::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        tubefeed::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("tubefeed {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    if let Err(e) = run(config).await {
        error!("tubefeed stopped: {}", e);
        std::process::exit(1);
    }
}
