//! The resolution engine: turns an expired application and its vote tally
//! into a verdict, acts on it, and retires the record.
//!
//! The verdict is persisted before anything visible happens. After that
//! point every step is best-effort: failures are logged and the engine moves
//! on, and the record is retired once every step has been attempted.

use tracing::{info, warn};
use warden_core::{
  application::{ApplicantId, Application},
  platform::{self, ChatPlatform, Whitelist},
  store::ApplicationStore,
  tally::{Tally, Verdict},
};

use crate::{Error, Result, ReviewContext, notice};

/// Which side effects went through. Steps that do not apply to the outcome
/// (role and whitelist on a denial) stay `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
  pub notified:           bool,
  pub role_granted:       bool,
  pub whitelisted:        bool,
  pub submission_deleted: bool,
  pub thread_deleted:     bool,
}

/// The result of resolving one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub applicant_id: ApplicantId,
  pub verdict:      Verdict,
  pub effects:      Effects,
}

impl<S, P, W> ReviewContext<S, P, W>
where
  S: ApplicationStore,
  P: ChatPlatform,
  W: Whitelist,
{
  /// Decide `application` from a raw `tally` (seed reactions included),
  /// persist the verdict, carry out its effects and retire the record.
  ///
  /// Fails without side effects if the verdict cannot be persisted; the
  /// record then stays pending for the next sweep.
  pub async fn resolve(&self, application: &Application, tally: Tally) -> Result<Resolution> {
    let verdict = Verdict::from_raw(tally);
    let id = application.applicant_id;

    self
      .store
      .record_outcome(id, verdict)
      .await
      .map_err(Error::store)?;

    info!(
      applicant_id = %id,
      thumbs_up = verdict.thumbs_up,
      thumbs_down = verdict.thumbs_down,
      outcome = %verdict.outcome,
      "verdict recorded"
    );
    self.status(notice::verdict_line(id, &verdict)).await;

    self.carry_out(application, verdict).await
  }

  /// Run the post-verdict steps for an application whose verdict is already
  /// stored, then retire it.
  ///
  /// Only fails if the record could not be retired.
  pub(crate) async fn carry_out(
    &self,
    application: &Application,
    verdict: Verdict,
  ) -> Result<Resolution> {
    let id = application.applicant_id;
    let refs = application.refs;
    let mut effects = Effects::default();

    let notice = notice::applicant_notice(verdict.outcome, &self.settings.community_name);
    effects.notified =
      best_effort(id, "notify applicant", self.platform.direct_message(id, notice).await);

    if verdict.outcome.is_approved() {
      effects.role_granted =
        best_effort(id, "grant member role", self.platform.grant_member_role(id).await);

      let username = application.form.target_username.as_str();
      effects.whitelisted =
        best_effort(id, "whitelist add", self.whitelist.add(username).await);
    }

    tokio::time::sleep(self.settings.cleanup_pause()).await;
    effects.submission_deleted = best_effort(
      id,
      "delete submission message",
      self.platform.delete_submission(refs.source_message).await,
    );

    tokio::time::sleep(self.settings.cleanup_pause()).await;
    effects.thread_deleted = best_effort(
      id,
      "delete discussion thread",
      self.platform.delete_thread(refs.discussion_thread).await,
    );

    self.store.delete(id).await.map_err(Error::store)?;
    info!(applicant_id = %id, ?effects, "application retired");

    Ok(Resolution { applicant_id: id, verdict, effects })
  }
}

/// Log a failed side effect and report whether it succeeded.
fn best_effort(id: ApplicantId, step: &'static str, result: platform::Result<()>) -> bool {
  match result {
    Ok(()) => true,
    Err(e) if e.is_not_found() => {
      warn!(applicant_id = %id, step, error = %e, "target already gone");
      false
    }
    Err(e) => {
      warn!(applicant_id = %id, step, error = %e, "side effect failed");
      false
    }
  }
}
