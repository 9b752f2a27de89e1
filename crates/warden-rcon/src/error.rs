//! Error types for the RCON client.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("timed out after {0:?}")]
  Timeout(Duration),

  #[error("authentication rejected by server")]
  AuthRejected,

  #[error("malformed packet: {0}")]
  Protocol(String),

  #[error("command body of {0} bytes exceeds the packet limit")]
  BodyTooLarge(usize),

  #[error("invalid player name {0:?}")]
  InvalidUsername(String),

  #[error("connection closed by server")]
  Closed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
