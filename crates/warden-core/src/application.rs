//! Application records, one per pending candidate.
//!
//! A record is created when a submission is ingested, read by every sweep
//! until it expires, stamped with a [`Verdict`] exactly once, and then
//! retired (deleted). No field other than the verdict is ever written after
//! creation.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::tally::Verdict;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// The platform user ID of the applicant. Persisted as its decimal string
/// form; unique across live records.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for ApplicantId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

impl From<ApplicantId> for String {
  fn from(id: ApplicantId) -> Self { id.to_string() }
}

impl TryFrom<String> for ApplicantId {
  type Error = ParseIntError;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

/// An opaque reference to an object owned by the chat platform (a thread or
/// a message). The core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Snowflake(pub u64);

impl fmt::Display for Snowflake {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for Snowflake {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

impl From<Snowflake> for String {
  fn from(id: Snowflake) -> Self { id.to_string() }
}

impl TryFrom<String> for Snowflake {
  type Error = ParseIntError;

  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// The free-text answers of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationForm {
  pub full_name:        String,
  pub email:            String,
  /// The applicant's in-game name; this is what gets whitelisted.
  pub target_username:  String,
  pub motivation:       String,
  pub favorite_aspect:  String,
  pub secondary_link_a: Option<String>,
  pub secondary_link_b: Option<String>,
}

/// The platform objects created while a submission is being ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionRefs {
  pub discussion_thread: Snowflake,
  pub vote_message:      Snowflake,
  pub source_message:    Snowflake,
}

// ─── NewApplication ──────────────────────────────────────────────────────────

/// A validated submission that has not yet been given its discussion
/// artifacts. Produced by [`crate::submission::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
  pub applicant_id: ApplicantId,
  pub form:         ApplicationForm,
  pub expiry_at:    DateTime<Utc>,
}

impl NewApplication {
  /// Attach the discussion thread, vote message and source message, yielding
  /// a record ready for [`crate::store::ApplicationStore::insert`].
  pub fn into_application(self, refs: DiscussionRefs) -> Application {
    Application {
      applicant_id: self.applicant_id,
      form: self.form,
      refs,
      expiry_at: self.expiry_at,
      verdict: None,
    }
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// A persisted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub applicant_id: ApplicantId,
  pub form:         ApplicationForm,
  pub refs:         DiscussionRefs,
  /// Submission time plus the review window; never changes after creation.
  pub expiry_at:    DateTime<Utc>,
  /// `None` until the sweep tallies the vote. Written at most once.
  pub verdict:      Option<Verdict>,
}

impl Application {
  /// Whether the review window has closed at `now`, allowing `tolerance`
  /// of early firing to absorb scheduler jitter.
  pub fn is_due(&self, now: DateTime<Utc>, tolerance: Duration) -> bool {
    now >= self.expiry_at - tolerance
  }
}
