//! One pass over every stored application.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use warden_core::{
  application::Application,
  platform::{ChatPlatform, Whitelist},
  store::ApplicationStore,
};

use crate::{Error, Resolution, Result, ReviewContext};

/// Counters for a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
  /// Records loaded from the store.
  pub examined:      usize,
  /// Records whose review window is still open.
  pub still_pending: usize,
  /// Records resolved and retired during this sweep.
  pub resolved:      usize,
  /// Due records left for the next sweep because something failed.
  pub skipped:       usize,
}

impl SweepReport {
  pub fn due(&self) -> usize { self.resolved + self.skipped }
}

impl<S, P, W> ReviewContext<S, P, W>
where
  S: ApplicationStore,
  P: ChatPlatform,
  W: Whitelist,
{
  /// Resolve every application whose window has closed at `now`.
  ///
  /// Records are handled one after another; a failure on one is logged and
  /// does not stop the rest. Only failing to load the table fails the sweep.
  pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport> {
    let applications = self.store.list_all().await.map_err(Error::store)?;
    let tolerance = self.settings.skew_tolerance();

    let mut report = SweepReport { examined: applications.len(), ..Default::default() };

    for application in &applications {
      if !application.is_due(now, tolerance) {
        report.still_pending += 1;
        continue;
      }

      match self.process(application).await {
        Ok(_) => report.resolved += 1,
        Err(e) => {
          error!(
            applicant_id = %application.applicant_id,
            error = %e,
            "resolution aborted; will retry next sweep"
          );
          report.skipped += 1;
        }
      }
    }

    info!(
      examined = report.examined,
      pending = report.still_pending,
      resolved = report.resolved,
      skipped = report.skipped,
      "sweep finished"
    );
    if report.due() > 0 {
      self
        .status(format!(
          "Sweep: {} application(s), {} resolved, {} deferred, {} still open.",
          report.examined, report.resolved, report.skipped, report.still_pending
        ))
        .await;
    }

    Ok(report)
  }

  async fn process(&self, application: &Application) -> Result<Resolution> {
    // A verdict from an earlier pass that never reached retirement: act on
    // the stored verdict instead of re-tallying.
    if let Some(verdict) = application.verdict {
      warn!(
        applicant_id = %application.applicant_id,
        outcome = %verdict.outcome,
        "resuming application resolved in an earlier sweep"
      );
      return self.carry_out(application, verdict).await;
    }

    let refs = application.refs;
    let tally = self
      .platform
      .fetch_tally(refs.discussion_thread, refs.vote_message)
      .await?;

    self.resolve(application, tally).await
  }
}
