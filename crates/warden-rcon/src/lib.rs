//! Source RCON client for Warden.
//!
//! Implements the small binary protocol Minecraft (and other Source-derived
//! servers) expose for remote administration, and uses it to back the
//! [`warden_core::platform::Whitelist`] contract.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn demo() -> warden_rcon::Result<()> {
//! use warden_rcon::{RconClient, RconConfig};
//!
//! let config = RconConfig::new("127.0.0.1", 25575, "hunter2");
//! let mut client = RconClient::connect(&config).await?;
//! client.command("whitelist add alexdoe").await?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod error;
mod packet;

pub use client::{RconClient, RconConfig, RconWhitelist};
pub use error::{Error, Result};
pub use packet::{Packet, PacketKind};
