//! Error types for `warden-core`.

use thiserror::Error;

use crate::application::ApplicantId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed submission: {0}")]
  MalformedSubmission(String),

  #[error("an application from {0} is already pending")]
  DuplicateApplication(ApplicantId),

  #[error("application not found: {0}")]
  ApplicationNotFound(ApplicantId),

  #[error("application {0} already has a recorded outcome")]
  AlreadyResolved(ApplicantId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
