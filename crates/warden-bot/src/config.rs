//! Runtime configuration, deserialised from `warden.toml` and `WARDEN__*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use warden_rcon::RconConfig;
use warden_review::ReviewSettings;

#[derive(Deserialize, Clone)]
pub struct BotConfig {
  /// Discord bot token.
  pub token:                   String,
  pub guild_id:                u64,
  /// Channel that receives the status mirror.
  pub status_channel_id:       u64,
  /// Channel the form collector posts submissions into.
  pub applications_channel_id: u64,
  /// Role mentioned on each new vote message.
  #[serde(default = "default_reviewer_role")]
  pub reviewer_role:           String,
  /// Role granted to approved applicants.
  #[serde(default = "default_member_role")]
  pub member_role:             String,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  pub rcon:                    RconConfig,
  #[serde(default)]
  pub review:                  ReviewSettings,
}

fn default_reviewer_role() -> String { "Reviewers".into() }

fn default_member_role() -> String { "Member".into() }

fn default_store_path() -> PathBuf { PathBuf::from("applications.db") }

impl BotConfig {
  /// Layer the optional TOML file at `path` under `WARDEN__`-prefixed
  /// environment variables (`WARDEN__RCON__PASSWORD` sets `rcon.password`).
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("WARDEN")
          .prefix_separator("__")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
