//! Intake: from a raw form submission to a stored, pending application.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use warden_core::{
  application::{Application, DiscussionRefs, Snowflake},
  platform::{ChatPlatform, Whitelist},
  store::ApplicationStore,
  submission::{self, FormField},
};

use crate::{Error, Result, ReviewContext};

impl<S, P, W> ReviewContext<S, P, W>
where
  S: ApplicationStore,
  P: ChatPlatform,
  W: Whitelist,
{
  /// Ingest the form fields of `source_message`.
  ///
  /// A second submission from an applicant who already has a pending
  /// application is rejected before anything is created on the platform.
  /// If the insert fails after the discussion thread was opened, the thread
  /// is deleted again.
  pub async fn intake(
    &self,
    source_message: Snowflake,
    fields: &[FormField],
    now: DateTime<Utc>,
  ) -> Result<Application> {
    let new = submission::parse_with_window(fields, now, self.settings.window())?;
    let id = new.applicant_id;

    if self.store.get(id).await.map_err(Error::store)?.is_some() {
      warn!(applicant_id = %id, "duplicate submission ignored");
      self
        .status(format!(
          "Ignored a second application from {id}; the first one is still under review."
        ))
        .await;
      return Err(warden_core::Error::DuplicateApplication(id).into());
    }

    let discussion = self.platform.open_discussion(id).await?;
    let application = new.into_application(DiscussionRefs {
      discussion_thread: discussion.thread,
      vote_message: discussion.vote_message,
      source_message,
    });

    if let Err(e) = self.store.insert(application.clone()).await {
      error!(applicant_id = %id, error = %e, "failed to store application");
      if let Err(cleanup) = self.platform.delete_thread(discussion.thread).await {
        warn!(applicant_id = %id, error = %cleanup, "failed to remove orphaned thread");
      }
      return Err(Error::store(e));
    }

    info!(applicant_id = %id, expiry_at = %application.expiry_at, "application stored");
    self
      .status(format!(
        "New application from {id}; voting closes {}.",
        application.expiry_at.format("%Y-%m-%d %H:%M UTC")
      ))
      .await;

    Ok(application)
  }
}
