//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Platform identifiers are
//! stored as decimal strings so that 64-bit snowflakes survive intact.

use chrono::{DateTime, Utc};
use warden_core::{
  application::{ApplicantId, Application, ApplicationForm, DiscussionRefs},
  tally::{Outcome, Verdict},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

pub fn encode_outcome(o: Outcome) -> &'static str {
  match o {
    Outcome::Approved => "approved",
    Outcome::Denied => "denied",
  }
}

pub fn decode_outcome(s: &str) -> Result<Outcome> {
  s.parse().map_err(|_| Error::UnknownOutcome(s.to_owned()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every SELECT against `applications`, in the order
/// [`RawApplication::from_row`] reads them.
pub const COLUMNS: &str = "applicant_id, full_name, email, target_username,
  motivation, favorite_aspect, secondary_link_a, secondary_link_b,
  discussion_thread_ref, vote_message_ref, source_message_ref, expiry_at,
  thumbs_up, thumbs_down, outcome";

/// Raw values read directly from an `applications` row.
pub struct RawApplication {
  pub applicant_id:          String,
  pub full_name:             String,
  pub email:                 String,
  pub target_username:       String,
  pub motivation:            String,
  pub favorite_aspect:       String,
  pub secondary_link_a:      Option<String>,
  pub secondary_link_b:      Option<String>,
  pub discussion_thread_ref: String,
  pub vote_message_ref:      String,
  pub source_message_ref:    String,
  pub expiry_at:             String,
  pub thumbs_up:             Option<u32>,
  pub thumbs_down:           Option<u32>,
  pub outcome:               Option<String>,
}

impl RawApplication {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      applicant_id:          row.get(0)?,
      full_name:             row.get(1)?,
      email:                 row.get(2)?,
      target_username:       row.get(3)?,
      motivation:            row.get(4)?,
      favorite_aspect:       row.get(5)?,
      secondary_link_a:      row.get(6)?,
      secondary_link_b:      row.get(7)?,
      discussion_thread_ref: row.get(8)?,
      vote_message_ref:      row.get(9)?,
      source_message_ref:    row.get(10)?,
      expiry_at:             row.get(11)?,
      thumbs_up:             row.get(12)?,
      thumbs_down:           row.get(13)?,
      outcome:               row.get(14)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    let applicant_id: ApplicantId = self.applicant_id.parse()?;

    let verdict = match (self.thumbs_up, self.thumbs_down, self.outcome) {
      (None, None, None) => None,
      (Some(thumbs_up), Some(thumbs_down), Some(outcome)) => Some(Verdict {
        thumbs_up,
        thumbs_down,
        outcome: decode_outcome(&outcome)?,
      }),
      _ => return Err(Error::PartialVerdict(applicant_id)),
    };

    Ok(Application {
      applicant_id,
      form: ApplicationForm {
        full_name:        self.full_name,
        email:            self.email,
        target_username:  self.target_username,
        motivation:       self.motivation,
        favorite_aspect:  self.favorite_aspect,
        secondary_link_a: self.secondary_link_a,
        secondary_link_b: self.secondary_link_b,
      },
      refs: DiscussionRefs {
        discussion_thread: self.discussion_thread_ref.parse()?,
        vote_message:      self.vote_message_ref.parse()?,
        source_message:    self.source_message_ref.parse()?,
      },
      expiry_at: decode_dt(&self.expiry_at)?,
      verdict,
    })
  }
}
