//! Texts sent to applicants and posted to the status channel.

use warden_core::{
  application::ApplicantId,
  tally::{Outcome, Verdict},
};

/// The direct message telling an applicant how their review went.
pub fn applicant_notice(outcome: Outcome, community: &str) -> String {
  match outcome {
    Outcome::Denied => format!(
      "Your application for {community} has been denied based on the votes from the \
       current members."
    ),
    Outcome::Approved => format!(
      "Congratulations! Your application for {community} has been approved based on the \
       votes from the current members. You will now receive the member role and be \
       automatically whitelisted on the server."
    ),
  }
}

pub fn verdict_line(applicant: ApplicantId, verdict: &Verdict) -> String {
  format!(
    "Votes for {applicant}: 👍 {}, 👎 {}. Result: {}.",
    verdict.thumbs_up, verdict.thumbs_down, verdict.outcome
  )
}
