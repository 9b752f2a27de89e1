//! Warden bot binary.
//!
//! Reads `warden.toml` (or the path given with `--config`), opens the SQLite
//! application store and either runs the bot or performs a one-off
//! maintenance command.
//!
//! ```text
//! warden run            # gateway + periodic sweeps until Ctrl-C
//! warden sweep          # resolve due applications once and exit
//! warden list --json    # dump stored applications
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serenity::all::{Client, GatewayIntents, Http};
use tokio::sync::oneshot;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warden_bot::{BotConfig, DiscordPlatform, Handler, Review, config::expand_tilde};
use warden_core::store::ApplicationStore as _;
use warden_rcon::RconWhitelist;
use warden_review::{ReviewContext, Scheduler};
use warden_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Community application review bot")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "warden.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Connect to Discord and review applications until interrupted (default).
  Run,
  /// Run a single sweep against the current time and exit.
  Sweep,
  /// Print every stored application.
  List {
    /// Emit JSON instead of one line per application.
    #[arg(long)]
    json: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = BotConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Run) {
    Command::List { json } => list(&store, json).await,
    Command::Sweep => {
      let review = build_review(store, &config)?;
      let report = review.sweep(Utc::now()).await.context("sweep failed")?;
      println!(
        "examined {}, pending {}, resolved {}, skipped {}",
        report.examined, report.still_pending, report.resolved, report.skipped
      );
      Ok(())
    }
    Command::Run => run(store, config).await,
  }
}

fn build_review(store: SqliteStore, config: &BotConfig) -> anyhow::Result<Review> {
  let http = Arc::new(Http::new(&config.token));
  let platform = DiscordPlatform::new(http, config).context("invalid Discord ids in config")?;
  Ok(ReviewContext::new(
    Arc::new(store),
    Arc::new(platform),
    Arc::new(RconWhitelist::new(config.rcon.clone())),
    config.review.clone(),
  ))
}

async fn list(store: &SqliteStore, json: bool) -> anyhow::Result<()> {
  let applications = store.list_all().await.context("failed to read applications")?;

  if json {
    println!("{}", serde_json::to_string_pretty(&applications)?);
    return Ok(());
  }

  if applications.is_empty() {
    println!("no applications");
  }
  for app in &applications {
    let state = app.verdict.map_or("pending".to_owned(), |v| {
      format!("{} ({}/{})", v.outcome, v.thumbs_up, v.thumbs_down)
    });
    println!(
      "{}\t{}\t{}\t{}",
      app.applicant_id,
      app.form.target_username,
      app.expiry_at.format("%Y-%m-%d %H:%M UTC"),
      state
    );
  }
  Ok(())
}

async fn run(store: SqliteStore, config: BotConfig) -> anyhow::Result<()> {
  let review = build_review(store, &config)?;
  let applications_channel = review.platform().applications_channel();

  let intents = GatewayIntents::GUILDS
    | GatewayIntents::GUILD_MESSAGES
    | GatewayIntents::GUILD_MESSAGE_REACTIONS
    | GatewayIntents::MESSAGE_CONTENT;

  let mut client = Client::builder(&config.token, intents)
    .event_handler(Handler::new(review.clone(), applications_channel))
    .await
    .context("failed to build Discord client")?;
  let shards = client.shard_manager.clone();

  let (stop_tx, stop_rx) = oneshot::channel::<()>();
  let scheduler = tokio::spawn(Scheduler::new(review).run(async {
    let _ = stop_rx.await;
  }));

  let outcome = tokio::select! {
    res = client.start() => res.context("gateway connection failed"),
    _ = tokio::signal::ctrl_c() => {
      tracing::info!("interrupt received, shutting down");
      shards.shutdown_all().await;
      Ok(())
    }
  };

  let _ = stop_tx.send(());
  scheduler.await.context("scheduler task panicked")?;

  outcome
}
