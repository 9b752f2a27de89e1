//! Discord front end for Warden.
//!
//! Wires the review lifecycle from `warden-review` to a Discord guild: the
//! [`DiscordPlatform`] adapter implements the chat-platform contract over
//! serenity's REST client, and [`Handler`] turns form submissions posted in
//! the applications channel into intake calls.

pub mod config;
pub mod discord;
pub mod handler;

pub use config::BotConfig;
pub use discord::DiscordPlatform;
pub use handler::Handler;

use warden_rcon::RconWhitelist;
use warden_review::ReviewContext;
use warden_store_sqlite::SqliteStore;

/// The review context as deployed: SQLite, Discord and RCON.
pub type Review = ReviewContext<SqliteStore, DiscordPlatform, RconWhitelist>;
