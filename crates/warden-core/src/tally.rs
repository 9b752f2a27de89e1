//! Vote tallies and the decision rule.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Reaction counts on a vote message.
///
/// Counts read from the platform include the bot's own seed reaction on each
/// side; [`Tally::adjusted`] removes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
  pub up:   u32,
  pub down: u32,
}

impl Tally {
  pub fn new(up: u32, down: u32) -> Self { Self { up, down } }

  /// Remove the seed reaction from both sides. A count of zero (the seed was
  /// removed by a moderator) stays at zero.
  pub fn adjusted(self) -> Self {
    Self {
      up:   self.up.saturating_sub(1),
      down: self.down.saturating_sub(1),
    }
  }
}

/// The final result of a review.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
  Approved,
  Denied,
}

impl Outcome {
  /// Strict majority approves; a tie denies.
  pub fn decide(adjusted: Tally) -> Self {
    if adjusted.up > adjusted.down {
      Self::Approved
    } else {
      Self::Denied
    }
  }

  pub fn is_approved(self) -> bool { matches!(self, Self::Approved) }
}

/// The write-once triple stamped on an application when it is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub thumbs_up:   u32,
  pub thumbs_down: u32,
  pub outcome:     Outcome,
}

impl Verdict {
  /// Adjust a raw platform tally and decide.
  pub fn from_raw(raw: Tally) -> Self {
    let adjusted = raw.adjusted();
    Self {
      thumbs_up:   adjusted.up,
      thumbs_down: adjusted.down,
      outcome:     Outcome::decide(adjusted),
    }
  }
}
