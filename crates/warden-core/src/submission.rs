//! Submission parser: turns the ordered field list of a form embed into a
//! validated [`NewApplication`].
//!
//! The form collector always emits fields in the same order:
//!
//! | position | field |
//! |---|---|
//! | 0 | applicant user ID |
//! | 1 | full name |
//! | 2 | email |
//! | 3 | in-game username |
//! | 4 | why they want to join |
//! | 5 | favourite aspect |
//! | 6 | first optional link |
//! | 7 | second optional link |
//!
//! Parsing is pure: the caller supplies `now`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  application::{ApplicantId, ApplicationForm, NewApplication},
};

/// How long the community has to vote on an application, in seconds (two
/// days).
pub const APPLICATION_REVIEW_WINDOW_SECS: i64 = 60 * 60 * 24 * 2;

/// [`APPLICATION_REVIEW_WINDOW_SECS`] as a [`Duration`].
pub fn application_review_window() -> Duration {
  Duration::seconds(APPLICATION_REVIEW_WINDOW_SECS)
}

const REQUIRED: [&str; 6] = [
  "applicant id",
  "full name",
  "email",
  "username",
  "motivation",
  "favorite aspect",
];

/// One labelled field of a form embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
  pub name:  String,
  pub value: String,
}

impl FormField {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self { name: name.into(), value: value.into() }
  }
}

/// Parse with the standard two-day review window.
pub fn parse(fields: &[FormField], now: DateTime<Utc>) -> Result<NewApplication> {
  parse_with_window(fields, now, application_review_window())
}

/// Parse, setting `expiry_at` to `now + window`.
pub fn parse_with_window(
  fields: &[FormField],
  now: DateTime<Utc>,
  window: Duration,
) -> Result<NewApplication> {
  if fields.len() < REQUIRED.len() {
    return Err(Error::MalformedSubmission(format!(
      "expected at least {} fields, got {}",
      REQUIRED.len(),
      fields.len()
    )));
  }

  for (field, label) in fields.iter().zip(REQUIRED) {
    if field.value.trim().is_empty() {
      return Err(Error::MalformedSubmission(format!("{label} is empty")));
    }
  }

  let applicant_id = fields[0]
    .value
    .parse::<ApplicantId>()
    .ok()
    .filter(|id| id.0 != 0)
    .ok_or_else(|| {
      Error::MalformedSubmission(format!(
        "applicant id {:?} is not a numeric user id",
        fields[0].value
      ))
    })?;

  let form = ApplicationForm {
    full_name:        fields[1].value.clone(),
    email:            fields[2].value.clone(),
    target_username:  fields[3].value.clone(),
    motivation:       fields[4].value.clone(),
    favorite_aspect:  fields[5].value.clone(),
    secondary_link_a: optional(fields, 6),
    secondary_link_b: optional(fields, 7),
  };

  Ok(NewApplication { applicant_id, form, expiry_at: now + window })
}

fn optional(fields: &[FormField], index: usize) -> Option<String> {
  fields
    .get(index)
    .map(|f| f.value.clone())
    .filter(|v| !v.is_empty())
}
