//! Contracts for the external collaborators the review engine drives: the
//! chat platform (threads, messages, reactions, roles, DMs) and the game
//! server's whitelist.
//!
//! Adapters live in their own crates (`warden-bot`, `warden-rcon`); the
//! engine only ever sees these traits.

use std::future::Future;

use thiserror::Error;

use crate::{
  application::{ApplicantId, Snowflake},
  tally::Tally,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failed collaborator call.
#[derive(Debug, Error)]
pub enum Error {
  /// The referenced object (message, thread, member, role) no longer exists.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("external call failed: {0}")]
  Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn failed(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Failed(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Chat platform ───────────────────────────────────────────────────────────

/// The thread and seeded vote message opened for a new submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discussion {
  pub thread:       Snowflake,
  pub vote_message: Snowflake,
}

/// The chat platform as seen by the review engine.
pub trait ChatPlatform: Send + Sync {
  /// Open a discussion thread for `applicant`, post the vote message in it
  /// and seed it with one approve and one deny reaction.
  fn open_discussion(
    &self,
    applicant: ApplicantId,
  ) -> impl Future<Output = Result<Discussion>> + Send + '_;

  /// Read the raw reaction counts (seed reactions included) of the vote
  /// message inside `thread`. Fails with [`Error::NotFound`] if either is
  /// gone.
  fn fetch_tally(
    &self,
    thread: Snowflake,
    vote_message: Snowflake,
  ) -> impl Future<Output = Result<Tally>> + Send + '_;

  /// Send a direct message to the applicant.
  fn direct_message(
    &self,
    applicant: ApplicantId,
    content: String,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Give the applicant the membership role.
  fn grant_member_role(
    &self,
    applicant: ApplicantId,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Delete the original submission message in the applications channel.
  fn delete_submission(
    &self,
    source_message: Snowflake,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Delete a discussion thread.
  fn delete_thread(
    &self,
    thread: Snowflake,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Mirror an operator-facing status line into the status channel.
  fn report_status(
    &self,
    line: String,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Whitelist ───────────────────────────────────────────────────────────────

/// The game server's whitelist.
pub trait Whitelist: Send + Sync {
  /// Allow `username` to join the game server.
  fn add<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<()>> + Send + 'a;
}
