//! Lifecycle tests: intake, sweep and resolution against an in-memory SQLite
//! store and recording fakes.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use warden_core::{
  application::{ApplicantId, Snowflake},
  store::ApplicationStore,
  submission::FormField,
  tally::{Outcome, Tally, Verdict},
};
use warden_store_sqlite::SqliteStore;

use crate::{
  Error, ReviewContext, ReviewSettings, Scheduler,
  testing::{Call, FakePlatform, FakeWhitelist, Faults, RecordingStore},
};

type Ctx = ReviewContext<SqliteStore, FakePlatform, FakeWhitelist>;

const SOURCE: Snowflake = Snowflake(555);

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 4, 2, 20, 0, 0).unwrap() }

fn two_days() -> chrono::Duration { chrono::Duration::seconds(172_800) }

fn settings() -> ReviewSettings {
  ReviewSettings {
    cleanup_pause_secs: 0,
    community_name: "Infinite Realms".into(),
    ..ReviewSettings::default()
  }
}

async fn context_with(platform: FakePlatform, whitelist: FakeWhitelist) -> Ctx {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  ReviewContext::new(Arc::new(store), Arc::new(platform), Arc::new(whitelist), settings())
}

async fn context() -> Ctx { context_with(FakePlatform::new(), FakeWhitelist::default()).await }

fn fields(id: &str) -> Vec<FormField> {
  vec![
    FormField::new("Discord ID", id),
    FormField::new("Full name", "Alex Doe"),
    FormField::new("Email", "alex@example.com"),
    FormField::new("Minecraft username", "alexdoe"),
    FormField::new("Why join?", "Friends play here"),
    FormField::new("Favourite aspect", "Building"),
  ]
}

/// Ingest a submission for `id` at `t0` and give its vote message `tally`.
async fn submit(ctx: &Ctx, id: &str, tally: Option<Tally>) -> ApplicantId {
  let app = ctx.intake(SOURCE, &fields(id), t0()).await.unwrap();
  if let Some(tally) = tally {
    ctx.platform().set_tally(app.refs.vote_message, tally);
  }
  app.applicant_id
}

// ─── Intake ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn intake_stores_pending_application() {
  let ctx = context().await;
  let app = ctx.intake(SOURCE, &fields("100"), t0()).await.unwrap();

  let stored = ctx.store().get(ApplicantId(100)).await.unwrap().unwrap();
  assert_eq!(stored, app);
  assert_eq!(stored.form.secondary_link_a, None);
  assert_eq!(stored.form.secondary_link_b, None);
  assert_eq!(stored.expiry_at, t0() + two_days());
  assert_eq!(stored.refs.source_message, SOURCE);
  assert!(stored.verdict.is_none());

  assert_eq!(ctx.platform().side_effects(), vec![Call::OpenDiscussion(ApplicantId(100))]);
}

#[tokio::test]
async fn malformed_submission_creates_nothing() {
  let ctx = context().await;
  let short: Vec<_> = fields("100").into_iter().take(4).collect();

  let err = ctx.intake(SOURCE, &short, t0()).await.unwrap_err();
  assert!(matches!(err, Error::Core(warden_core::Error::MalformedSubmission(_))));
  assert!(ctx.platform().calls().is_empty());
  assert!(ctx.store().list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_submission_is_rejected() {
  let ctx = context().await;
  let first = ctx.intake(SOURCE, &fields("100"), t0()).await.unwrap();

  let err = ctx
    .intake(Snowflake(556), &fields("100"), t0() + chrono::Duration::hours(1))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(warden_core::Error::DuplicateApplication(ApplicantId(100)))
  ));

  // Only one discussion was opened, and the stored record is the first one.
  assert_eq!(ctx.platform().side_effects(), vec![Call::OpenDiscussion(ApplicantId(100))]);
  let stored = ctx.store().get(ApplicantId(100)).await.unwrap().unwrap();
  assert_eq!(stored, first);
}

#[tokio::test]
async fn failed_discussion_leaves_store_untouched() {
  let ctx = context_with(
    FakePlatform::with_faults(Faults { open_discussion: true, ..Default::default() }),
    FakeWhitelist::default(),
  )
  .await;

  let err = ctx.intake(SOURCE, &fields("100"), t0()).await.unwrap_err();
  assert!(matches!(err, Error::Platform(_)));
  assert!(ctx.store().list_all().await.unwrap().is_empty());
}

// ─── Sweep: expiry ───────────────────────────────────────────────────────────

#[tokio::test]
async fn sweep_before_expiry_changes_nothing() {
  let ctx = context().await;
  submit(&ctx, "100", Some(Tally::new(3, 1))).await;
  let before = ctx.store().list_all().await.unwrap();
  let calls_before = ctx.platform().calls();

  for offset in [chrono::Duration::zero(), chrono::Duration::hours(47)] {
    let report = ctx.sweep(t0() + offset).await.unwrap();
    assert_eq!(report.examined, 1);
    assert_eq!(report.still_pending, 1);
    assert_eq!(report.due(), 0);
  }

  assert_eq!(ctx.store().list_all().await.unwrap(), before);
  assert_eq!(ctx.platform().calls(), calls_before);
  assert!(ctx.whitelist.added().is_empty());
}

#[tokio::test]
async fn skew_tolerance_allows_slightly_early_sweep() {
  let ctx = context().await;
  submit(&ctx, "100", Some(Tally::new(1, 1))).await;
  let expiry = t0() + two_days();

  let early = ctx.sweep(expiry - chrono::Duration::seconds(6)).await.unwrap();
  assert_eq!(early.still_pending, 1);

  let within = ctx.sweep(expiry - chrono::Duration::seconds(4)).await.unwrap();
  assert_eq!(within.resolved, 1);
}

// ─── Sweep: resolution ───────────────────────────────────────────────────────

#[tokio::test]
async fn approved_application_is_granted_and_retired() {
  let ctx = context().await;
  let id = submit(&ctx, "100", Some(Tally::new(3, 1))).await;
  let thread = ctx.store().get(id).await.unwrap().unwrap().refs.discussion_thread;

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.resolved, 1);
  assert_eq!(report.skipped, 0);

  assert!(ctx.store().get(id).await.unwrap().is_none());
  assert_eq!(ctx.whitelist.added(), vec!["alexdoe".to_string()]);

  let effects = ctx.platform().side_effects();
  assert_eq!(effects.len(), 5);
  assert!(matches!(&effects[1], Call::DirectMessage(ApplicantId(100), text) if text.starts_with("Congratulations!")));
  assert_eq!(effects[2], Call::GrantRole(id));
  assert_eq!(effects[3], Call::DeleteSubmission(SOURCE));
  assert_eq!(effects[4], Call::DeleteThread(thread));
}

#[tokio::test]
async fn resolve_reports_adjusted_verdict() {
  let ctx = context().await;
  let id = submit(&ctx, "100", None).await;
  let app = ctx.store().get(id).await.unwrap().unwrap();

  let resolution = ctx.resolve(&app, Tally::new(3, 1)).await.unwrap();
  assert_eq!(
    resolution.verdict,
    Verdict { thumbs_up: 2, thumbs_down: 0, outcome: Outcome::Approved }
  );
  assert!(resolution.effects.notified);
  assert!(resolution.effects.role_granted);
  assert!(resolution.effects.whitelisted);
  assert!(resolution.effects.submission_deleted);
  assert!(resolution.effects.thread_deleted);
  assert!(ctx.store().get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn tie_is_denied_without_role_or_whitelist() {
  let ctx = context().await;
  let id = submit(&ctx, "100", Some(Tally::new(5, 5))).await;

  ctx.sweep(t0() + two_days()).await.unwrap();

  assert!(ctx.store().get(id).await.unwrap().is_none());
  assert!(ctx.whitelist.added().is_empty());

  let effects = ctx.platform().side_effects();
  assert!(!effects.iter().any(|c| matches!(c, Call::GrantRole(_))));
  assert!(effects.iter().any(
    |c| matches!(c, Call::DirectMessage(_, text) if text.contains("denied"))
  ));
  assert!(effects.iter().any(|c| matches!(c, Call::DeleteSubmission(_))));
  assert!(effects.iter().any(|c| matches!(c, Call::DeleteThread(_))));
}

#[tokio::test]
async fn removed_seed_reactions_do_not_underflow() {
  let ctx = context().await;
  let id = submit(&ctx, "100", None).await;
  let app = ctx.store().get(id).await.unwrap().unwrap();

  let resolution = ctx.resolve(&app, Tally::new(0, 0)).await.unwrap();
  assert_eq!((resolution.verdict.thumbs_up, resolution.verdict.thumbs_down), (0, 0));
  assert_eq!(resolution.verdict.outcome, Outcome::Denied);
}

#[tokio::test]
async fn missing_vote_message_leaves_record_pending() {
  let ctx = context().await;
  let id = submit(&ctx, "100", None).await;

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.skipped, 1);
  assert_eq!(report.resolved, 0);

  let stored = ctx.store().get(id).await.unwrap().unwrap();
  assert!(stored.verdict.is_none());
  assert_eq!(ctx.platform().side_effects(), vec![Call::OpenDiscussion(id)]);
}

#[tokio::test]
async fn failure_on_one_record_does_not_stop_the_next() {
  let ctx = context().await;
  let broken = submit(&ctx, "1", None).await;
  let healthy = submit(&ctx, "2", Some(Tally::new(4, 1))).await;

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.examined, 2);
  assert_eq!(report.resolved, 1);
  assert_eq!(report.skipped, 1);

  assert!(ctx.store().get(broken).await.unwrap().is_some());
  assert!(ctx.store().get(healthy).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_side_effects_still_retire() {
  let faults = Faults {
    direct_message: true,
    grant_role: true,
    submission_gone: true,
    thread_gone: true,
    ..Default::default()
  };
  let ctx = context_with(FakePlatform::with_faults(faults), FakeWhitelist::failing()).await;
  let id = submit(&ctx, "100", None).await;
  let app = ctx.store().get(id).await.unwrap().unwrap();

  let resolution = ctx.resolve(&app, Tally::new(6, 3)).await.unwrap();
  assert_eq!(resolution.verdict.outcome, Outcome::Approved);
  assert_eq!(resolution.effects, Default::default());

  // Every step was still attempted.
  assert_eq!(ctx.whitelist.added(), vec!["alexdoe".to_string()]);
  assert_eq!(ctx.platform().side_effects().len(), 5);
  assert!(ctx.store().get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn retired_record_is_not_processed_again() {
  let ctx = context().await;
  submit(&ctx, "100", Some(Tally::new(3, 1))).await;

  ctx.sweep(t0() + two_days()).await.unwrap();
  let calls = ctx.platform().calls().len();

  let second = ctx.sweep(t0() + two_days() + chrono::Duration::minutes(5)).await.unwrap();
  assert_eq!(second.examined, 0);
  assert_eq!(ctx.platform().calls().len(), calls);
  assert_eq!(ctx.whitelist.added().len(), 1);
}

#[tokio::test]
async fn stored_verdict_is_resumed_without_retallying() {
  let ctx = context().await;
  let id = submit(&ctx, "100", Some(Tally::new(1, 9))).await;

  // An earlier pass recorded an approval and then crashed before acting.
  let earlier = Verdict { thumbs_up: 4, thumbs_down: 1, outcome: Outcome::Approved };
  ctx.store().record_outcome(id, earlier).await.unwrap();

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.resolved, 1);

  assert!(!ctx.platform().calls().iter().any(|c| matches!(c, Call::FetchTally(_))));
  assert!(ctx.platform().side_effects().contains(&Call::GrantRole(id)));
  assert_eq!(ctx.whitelist.added(), vec!["alexdoe".to_string()]);
  assert!(ctx.store().get(id).await.unwrap().is_none());
}

// ─── Sweep: verdict persistence ──────────────────────────────────────────────

type JournalCtx = ReviewContext<RecordingStore, FakePlatform, FakeWhitelist>;

/// A context whose store logs into the platform's call journal.
async fn journaled(refuse_verdict: bool) -> JournalCtx {
  let platform = FakePlatform::new();
  let store = RecordingStore::new(platform.journal(), refuse_verdict).await;
  ReviewContext::new(
    Arc::new(store),
    Arc::new(platform),
    Arc::new(FakeWhitelist::default()),
    settings(),
  )
}

#[tokio::test]
async fn verdict_is_stored_before_any_side_effect() {
  let ctx = journaled(false).await;
  let app = ctx.intake(SOURCE, &fields("100"), t0()).await.unwrap();
  let id = app.applicant_id;
  ctx.platform().set_tally(app.refs.vote_message, Tally::new(3, 1));

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.resolved, 1);

  let journal: Vec<Call> = ctx
    .platform()
    .calls()
    .into_iter()
    .filter(|c| !matches!(c, Call::Status(_) | Call::FetchTally(_)))
    .collect();
  let approved = Verdict { thumbs_up: 2, thumbs_down: 0, outcome: Outcome::Approved };
  assert_eq!(journal.len(), 7);
  assert_eq!(journal[..2], [Call::OpenDiscussion(id), Call::StoreVerdict(id, approved)]);
  assert!(matches!(&journal[2], Call::DirectMessage(a, _) if *a == id));
  assert_eq!(
    journal[3..],
    [
      Call::GrantRole(id),
      Call::DeleteSubmission(SOURCE),
      Call::DeleteThread(app.refs.discussion_thread),
      Call::Retire(id),
    ]
  );
  assert!(ctx.store().get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_verdict_write_leaves_record_pending_without_side_effects() {
  let ctx = journaled(true).await;
  let app = ctx.intake(SOURCE, &fields("100"), t0()).await.unwrap();
  let id = app.applicant_id;
  ctx.platform().set_tally(app.refs.vote_message, Tally::new(3, 1));

  let report = ctx.sweep(t0() + two_days()).await.unwrap();
  assert_eq!(report.resolved, 0);
  assert_eq!(report.skipped, 1);

  assert_eq!(ctx.platform().side_effects(), vec![Call::OpenDiscussion(id)]);
  assert!(ctx.whitelist.added().is_empty());
  assert!(!ctx.platform().calls().iter().any(|c| matches!(c, Call::Retire(_))));

  let stored = ctx.store().get(id).await.unwrap().unwrap();
  assert!(stored.verdict.is_none());
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn scheduler_resolves_expired_applications_until_shutdown() {
  let ctx = context().await;
  let long_ago = Utc::now() - chrono::Duration::days(3);
  let app = ctx.intake(SOURCE, &fields("100"), long_ago).await.unwrap();
  ctx.platform().set_tally(app.refs.vote_message, Tally::new(2, 1));

  let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
  let scheduler = Scheduler::with_period(ctx.clone(), Duration::from_millis(20));
  let handle = tokio::spawn(scheduler.run(async {
    let _ = stop_rx.await;
  }));

  tokio::time::timeout(Duration::from_secs(5), async {
    while ctx.store().get(app.applicant_id).await.unwrap().is_some() {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("application retired by scheduler");

  stop_tx.send(()).unwrap();
  tokio::time::timeout(Duration::from_secs(5), handle)
    .await
    .expect("scheduler stops")
    .unwrap();
}

#[tokio::test]
async fn scheduler_returns_on_shutdown() {
  let ctx = context().await;
  let scheduler = Scheduler::new(ctx);

  tokio::time::timeout(Duration::from_secs(5), scheduler.run(std::future::ready(())))
    .await
    .expect("scheduler returns once shutdown resolves");
}
