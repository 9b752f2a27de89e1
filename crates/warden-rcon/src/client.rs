//! Async RCON connection and the [`Whitelist`] adapter built on it.

use std::time::Duration;

use bytes::BytesMut;
use serde::Deserialize;
use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::TcpStream,
};
use warden_core::platform::{self, Whitelist};

use crate::{
  Error, Result,
  packet::{Packet, PacketKind},
};

/// Connection parameters for the game server's admin channel.
#[derive(Debug, Clone, Deserialize)]
pub struct RconConfig {
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub password:     String,
  /// Bound on connecting and on each request/response exchange.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_port() -> u16 { 25575 }

fn default_timeout_secs() -> u64 { 10 }

impl RconConfig {
  pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
    Self {
      host: host.into(),
      port,
      password: password.into(),
      timeout_secs: default_timeout_secs(),
    }
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// An authenticated RCON session.
pub struct RconClient {
  stream:  TcpStream,
  buf:     BytesMut,
  next_id: i32,
  timeout: Duration,
}

impl RconClient {
  /// Connect and log in.
  pub async fn connect(config: &RconConfig) -> Result<Self> {
    let timeout = config.timeout();
    let address = (config.host.as_str(), config.port);
    let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
      .await
      .map_err(|_| Error::Timeout(timeout))??;

    let mut client = Self { stream, buf: BytesMut::with_capacity(4096), next_id: 1, timeout };
    client.login(&config.password).await?;
    Ok(client)
  }

  async fn login(&mut self, password: &str) -> Result<()> {
    let id = self.allocate_id();
    self.send(Packet::new(id, PacketKind::Login, password)).await?;

    // Some servers send an empty response value ahead of the auth response.
    loop {
      let reply = self.recv().await?;
      if reply.kind != PacketKind::CommandOrAuthResponse {
        continue;
      }
      if reply.request_id == -1 {
        return Err(Error::AuthRejected);
      }
      if reply.request_id != id {
        return Err(Error::Protocol(format!(
          "auth response for request {} while waiting on {id}",
          reply.request_id
        )));
      }
      return Ok(());
    }
  }

  /// Run a console command and return the server's reply body verbatim.
  pub async fn command(&mut self, command: &str) -> Result<String> {
    let id = self.allocate_id();
    self
      .send(Packet::new(id, PacketKind::CommandOrAuthResponse, command))
      .await?;

    loop {
      let reply = self.recv().await?;
      if reply.request_id == id && reply.kind == PacketKind::ResponseValue {
        return Ok(reply.body);
      }
      tracing::debug!(request_id = reply.request_id, "ignoring unrelated rcon packet");
    }
  }

  fn allocate_id(&mut self) -> i32 {
    let id = self.next_id;
    self.next_id = self.next_id.checked_add(1).unwrap_or(1);
    id
  }

  async fn send(&mut self, packet: Packet) -> Result<()> {
    let mut out = BytesMut::new();
    packet.encode(&mut out)?;
    tokio::time::timeout(self.timeout, self.stream.write_all(&out))
      .await
      .map_err(|_| Error::Timeout(self.timeout))??;
    Ok(())
  }

  async fn recv(&mut self) -> Result<Packet> {
    loop {
      if let Some(packet) = Packet::decode(&mut self.buf)? {
        return Ok(packet);
      }
      let read = tokio::time::timeout(self.timeout, self.stream.read_buf(&mut self.buf))
        .await
        .map_err(|_| Error::Timeout(self.timeout))??;
      if read == 0 {
        return Err(Error::Closed);
      }
    }
  }

  /// Close the connection.
  pub async fn disconnect(mut self) -> Result<()> {
    self.stream.shutdown().await?;
    Ok(())
  }
}

// ─── Whitelist adapter ───────────────────────────────────────────────────────

/// Adds players to the server whitelist over a fresh RCON connection per
/// call: connect, one `whitelist add`, disconnect.
#[derive(Debug, Clone)]
pub struct RconWhitelist {
  config: RconConfig,
}

impl RconWhitelist {
  pub fn new(config: RconConfig) -> Self { Self { config } }

  async fn add_player(&self, username: &str) -> Result<String> {
    let username = player_name(username)?;
    let mut client = RconClient::connect(&self.config).await?;
    let reply = client.command(&format!("whitelist add {username}")).await?;
    client.disconnect().await?;
    Ok(reply)
  }
}

/// The trimmed name, refused if it is empty or would split into more than
/// one console argument.
fn player_name(raw: &str) -> Result<&str> {
  let name = raw.trim();
  if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
    return Err(Error::InvalidUsername(raw.to_owned()));
  }
  Ok(name)
}

impl Whitelist for RconWhitelist {
  async fn add(&self, username: &str) -> platform::Result<()> {
    let reply = self.add_player(username).await.map_err(platform::Error::failed)?;
    tracing::info!(username = username.trim(), reply = %reply.trim(), "whitelist add sent");
    Ok(())
  }
}
