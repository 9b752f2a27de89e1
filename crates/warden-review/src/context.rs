use std::sync::Arc;

use warden_core::{
  platform::{ChatPlatform, Whitelist},
  store::ApplicationStore,
};

use crate::ReviewSettings;

/// Everything the review lifecycle needs, constructed once at startup and
/// passed to each component explicitly.
///
/// Cloning is cheap; the collaborators are reference-counted.
pub struct ReviewContext<S, P, W> {
  pub(crate) store:     Arc<S>,
  pub(crate) platform:  Arc<P>,
  pub(crate) whitelist: Arc<W>,
  pub(crate) settings:  ReviewSettings,
}

impl<S, P, W> Clone for ReviewContext<S, P, W> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      platform:  Arc::clone(&self.platform),
      whitelist: Arc::clone(&self.whitelist),
      settings:  self.settings.clone(),
    }
  }
}

impl<S, P, W> ReviewContext<S, P, W>
where
  S: ApplicationStore,
  P: ChatPlatform,
  W: Whitelist,
{
  pub fn new(
    store: Arc<S>,
    platform: Arc<P>,
    whitelist: Arc<W>,
    settings: ReviewSettings,
  ) -> Self {
    Self { store, platform, whitelist, settings }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn platform(&self) -> &P { &self.platform }

  pub fn settings(&self) -> &ReviewSettings { &self.settings }

  /// Mirror a line to the status channel; failures are only logged.
  pub async fn status(&self, line: String) {
    if let Err(e) = self.platform.report_status(line).await {
      tracing::warn!(error = %e, "failed to post status line");
    }
  }
}
