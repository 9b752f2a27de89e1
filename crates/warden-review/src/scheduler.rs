//! Periodic sweep driver.

use std::{future::Future, time::Duration};

use chrono::Utc;
use tokio::time::{MissedTickBehavior, interval};
use warden_core::{
  platform::{ChatPlatform, Whitelist},
  store::ApplicationStore,
};

use crate::ReviewContext;

/// Runs [`ReviewContext::sweep`] on a fixed period until shut down.
///
/// Sweeps never overlap: the next tick is not awaited until the current
/// sweep has returned, and a sweep that overruns the period delays the
/// schedule rather than triggering a burst of catch-up ticks.
pub struct Scheduler<S, P, W> {
  context: ReviewContext<S, P, W>,
  period:  Duration,
}

impl<S, P, W> Scheduler<S, P, W>
where
  S: ApplicationStore,
  P: ChatPlatform,
  W: Whitelist,
{
  /// A scheduler ticking at the context's configured sweep interval.
  pub fn new(context: ReviewContext<S, P, W>) -> Self {
    let period = context.settings().sweep_interval();
    Self::with_period(context, period)
  }

  pub fn with_period(context: ReviewContext<S, P, W>, period: Duration) -> Self {
    Self { context, period }
  }

  /// Sweep immediately, then once per period, until `shutdown` completes.
  ///
  /// Shutdown is only observed between sweeps; a sweep in progress always
  /// runs to completion.
  pub async fn run(self, shutdown: impl Future<Output = ()>) {
    let mut ticker = interval(self.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(period = ?self.period, "scheduler started");

    loop {
      tokio::select! {
        _ = &mut shutdown => break,
        _ = ticker.tick() => {
          if let Err(e) = self.context.sweep(Utc::now()).await {
            tracing::error!(error = %e, "sweep failed");
          }
        }
      }
    }

    tracing::info!("scheduler stopped");
  }
}
