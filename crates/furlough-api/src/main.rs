//! furlough server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, registers the Telegram webhook, and serves the webhook plus the
//! listing API over HTTP until ctrl-c.

use std::{
  collections::HashSet,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use furlough_api::{AppState, ServerConfig, router};
use furlough_bot::{Engine, telegram::TelegramClient};
use furlough_core::{
  person::DEFAULT_RANKS, policy::DeadlinePolicy, store::LeaveStore as _,
};
use furlough_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Furlough leave-request server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FURLOUGH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let policy = DeadlinePolicy::from_hours(
    server_cfg.tz_offset_hours,
    server_cfg.same_day_cutoff_hour,
    server_cfg.weekend_cutoff_hour,
  )
  .context("tz offset or cutoff hours out of range")?;

  // Open the SQLite store and make sure the rank catalog is usable.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  store
    .seed_ranks(DEFAULT_RANKS.map(str::to_owned).to_vec())
    .await
    .context("failed to seed the rank catalog")?;
  let store = Arc::new(store);

  // Point the Bot API at our webhook.
  let telegram = TelegramClient::new(&server_cfg.bot_token)
    .context("failed to build the Telegram client")?;
  let webhook_url =
    format!("{}/webhook", server_cfg.public_url.trim_end_matches('/'));
  telegram
    .set_webhook(&webhook_url)
    .await
    .with_context(|| format!("failed to register webhook at {webhook_url}"))?;

  let admins: HashSet<i64> = server_cfg.admin_ids.iter().copied().collect();
  let engine = Engine::new(store.clone(), telegram, policy, admins);

  let state = AppState {
    store,
    engine: Arc::new(engine),
    config: Arc::new(server_cfg.clone()),
  };

  let app = router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(error) = tokio::signal::ctrl_c().await {
    tracing::error!(%error, "failed to listen for ctrl-c");
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
