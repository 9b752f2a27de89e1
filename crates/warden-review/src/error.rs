//! Error type for `warden-review`.

use thiserror::Error;
use warden_core::platform;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] warden_core::Error),

  #[error("platform error: {0}")]
  Platform(#[from] platform::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
