//! Error type for `warden-store-sqlite`.

use thiserror::Error;
use warden_core::application::ApplicantId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] warden_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("id parse error: {0}")]
  Id(#[from] std::num::ParseIntError),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown outcome: {0:?}")]
  UnknownOutcome(String),

  /// A row has some but not all of its verdict columns set.
  #[error("application {0} has a partially written verdict")]
  PartialVerdict(ApplicantId),
}

impl Error {
  pub fn is_duplicate(&self) -> bool {
    matches!(self, Self::Core(warden_core::Error::DuplicateApplication(_)))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(warden_core::Error::ApplicationNotFound(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
