//! Recording fakes for the collaborator traits.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
  },
};

use warden_core::{
  application::{ApplicantId, Application, Snowflake},
  platform::{ChatPlatform, Discussion, Error, Result, Whitelist},
  store::ApplicationStore,
  tally::{Tally, Verdict},
};
use warden_store_sqlite::SqliteStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  OpenDiscussion(ApplicantId),
  FetchTally(Snowflake),
  DirectMessage(ApplicantId, String),
  GrantRole(ApplicantId),
  DeleteSubmission(Snowflake),
  DeleteThread(Snowflake),
  Status(String),
  /// Written by [`RecordingStore`] into the same journal.
  StoreVerdict(ApplicantId, Verdict),
  Retire(ApplicantId),
}

/// Which calls the fake platform should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
  pub direct_message:    bool,
  pub grant_role:        bool,
  /// Report the submission message as already deleted.
  pub submission_gone:   bool,
  /// Report the thread as already deleted.
  pub thread_gone:       bool,
  pub open_discussion:   bool,
}

#[derive(Default)]
pub struct FakePlatform {
  calls:   Arc<Mutex<Vec<Call>>>,
  /// Raw tallies keyed by vote message; a missing entry reads as a deleted
  /// message.
  tallies: Mutex<HashMap<Snowflake, Tally>>,
  next_id: AtomicU64,
  faults:  Faults,
}

impl FakePlatform {
  pub fn new() -> Self { Self { next_id: AtomicU64::new(9000), ..Default::default() } }

  pub fn with_faults(faults: Faults) -> Self { Self { faults, ..Self::new() } }

  pub fn set_tally(&self, vote_message: Snowflake, tally: Tally) {
    self.tallies.lock().unwrap().insert(vote_message, tally);
  }

  pub fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  /// The call log, for a [`RecordingStore`] to append to.
  pub fn journal(&self) -> Arc<Mutex<Vec<Call>>> { Arc::clone(&self.calls) }

  /// Calls that change something visible to users, in order.
  pub fn side_effects(&self) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|c| {
        !matches!(
          c,
          Call::Status(_) | Call::FetchTally(_) | Call::StoreVerdict(..) | Call::Retire(_)
        )
      })
      .collect()
  }

  fn record(&self, call: Call) { self.calls.lock().unwrap().push(call); }

  fn fresh_id(&self) -> Snowflake { Snowflake(self.next_id.fetch_add(1, Ordering::Relaxed)) }
}

#[derive(Debug, thiserror::Error)]
#[error("simulated outage")]
struct Outage;

fn outage() -> Error { Error::failed(Outage) }

impl ChatPlatform for FakePlatform {
  async fn open_discussion(&self, applicant: ApplicantId) -> Result<Discussion> {
    self.record(Call::OpenDiscussion(applicant));
    if self.faults.open_discussion {
      return Err(outage());
    }
    Ok(Discussion { thread: self.fresh_id(), vote_message: self.fresh_id() })
  }

  async fn fetch_tally(&self, _thread: Snowflake, vote_message: Snowflake) -> Result<Tally> {
    self.record(Call::FetchTally(vote_message));
    self
      .tallies
      .lock()
      .unwrap()
      .get(&vote_message)
      .copied()
      .ok_or_else(|| Error::NotFound(format!("message {vote_message}")))
  }

  async fn direct_message(&self, applicant: ApplicantId, content: String) -> Result<()> {
    self.record(Call::DirectMessage(applicant, content));
    if self.faults.direct_message { Err(outage()) } else { Ok(()) }
  }

  async fn grant_member_role(&self, applicant: ApplicantId) -> Result<()> {
    self.record(Call::GrantRole(applicant));
    if self.faults.grant_role { Err(outage()) } else { Ok(()) }
  }

  async fn delete_submission(&self, source_message: Snowflake) -> Result<()> {
    self.record(Call::DeleteSubmission(source_message));
    if self.faults.submission_gone {
      Err(Error::NotFound(format!("message {source_message}")))
    } else {
      Ok(())
    }
  }

  async fn delete_thread(&self, thread: Snowflake) -> Result<()> {
    self.record(Call::DeleteThread(thread));
    if self.faults.thread_gone {
      Err(Error::NotFound(format!("thread {thread}")))
    } else {
      Ok(())
    }
  }

  async fn report_status(&self, line: String) -> Result<()> {
    self.record(Call::Status(line));
    Ok(())
  }
}

#[derive(Default)]
pub struct FakeWhitelist {
  added: Mutex<Vec<String>>,
  fail:  bool,
}

impl FakeWhitelist {
  pub fn failing() -> Self { Self { fail: true, ..Default::default() } }

  pub fn added(&self) -> Vec<String> { self.added.lock().unwrap().clone() }
}

impl Whitelist for FakeWhitelist {
  async fn add(&self, username: &str) -> Result<()> {
    self.added.lock().unwrap().push(username.to_owned());
    if self.fail { Err(outage()) } else { Ok(()) }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StoreFault {
  #[error(transparent)]
  Sqlite(#[from] warden_store_sqlite::Error),
  #[error("simulated write failure")]
  Refused,
}

/// An in-memory SQLite store that logs verdict writes and retirements into a
/// shared journal, and can be told to refuse verdict writes.
pub struct RecordingStore {
  inner:          SqliteStore,
  journal:        Arc<Mutex<Vec<Call>>>,
  refuse_verdict: bool,
}

impl RecordingStore {
  pub async fn new(journal: Arc<Mutex<Vec<Call>>>, refuse_verdict: bool) -> Self {
    let inner = SqliteStore::open_in_memory().await.expect("in-memory store");
    Self { inner, journal, refuse_verdict }
  }
}

impl ApplicationStore for RecordingStore {
  type Error = StoreFault;

  async fn insert(&self, application: Application) -> Result<(), StoreFault> {
    Ok(self.inner.insert(application).await?)
  }

  async fn get(&self, applicant_id: ApplicantId) -> Result<Option<Application>, StoreFault> {
    Ok(self.inner.get(applicant_id).await?)
  }

  async fn list_all(&self) -> Result<Vec<Application>, StoreFault> {
    Ok(self.inner.list_all().await?)
  }

  async fn record_outcome(
    &self,
    applicant_id: ApplicantId,
    verdict: Verdict,
  ) -> Result<(), StoreFault> {
    if self.refuse_verdict {
      return Err(StoreFault::Refused);
    }
    self.inner.record_outcome(applicant_id, verdict).await?;
    self.journal.lock().unwrap().push(Call::StoreVerdict(applicant_id, verdict));
    Ok(())
  }

  async fn delete(&self, applicant_id: ApplicantId) -> Result<(), StoreFault> {
    self.inner.delete(applicant_id).await?;
    self.journal.lock().unwrap().push(Call::Retire(applicant_id));
    Ok(())
  }
}
