use std::time::Duration;

use serde::Deserialize;
use warden_core::submission::APPLICATION_REVIEW_WINDOW_SECS;

/// Timing and wording knobs for the review lifecycle. Deserialised from the
/// `[review]` table of the bot configuration; every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
  /// How long voting stays open after a submission.
  pub window_secs:         i64,
  /// Time between sweeps.
  pub sweep_interval_secs: u64,
  /// How early a sweep may treat an application as expired.
  pub skew_tolerance_secs: i64,
  /// Pause before each cleanup deletion.
  pub cleanup_pause_secs:  u64,
  /// Delay between a submission event and re-reading its message.
  pub ingest_delay_secs:   u64,
  /// Community name used in applicant notifications.
  pub community_name:      String,
}

impl Default for ReviewSettings {
  fn default() -> Self {
    Self {
      window_secs:         APPLICATION_REVIEW_WINDOW_SECS,
      sweep_interval_secs: 300,
      skew_tolerance_secs: 5,
      cleanup_pause_secs:  5,
      ingest_delay_secs:   5,
      community_name:      "the community".into(),
    }
  }
}

impl ReviewSettings {
  pub fn window(&self) -> chrono::Duration { chrono::Duration::seconds(self.window_secs) }

  pub fn skew_tolerance(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.skew_tolerance_secs)
  }

  pub fn sweep_interval(&self) -> Duration { Duration::from_secs(self.sweep_interval_secs) }

  pub fn cleanup_pause(&self) -> Duration { Duration::from_secs(self.cleanup_pause_secs) }

  pub fn ingest_delay(&self) -> Duration { Duration::from_secs(self.ingest_delay_secs) }
}
