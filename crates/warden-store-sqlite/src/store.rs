//! [`SqliteStore`], the SQLite implementation of [`ApplicationStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use warden_core::{
  application::{ApplicantId, Application},
  store::ApplicationStore,
  tally::Verdict,
};

use crate::{
  Error, Result,
  encode::{COLUMNS, RawApplication, encode_dt, encode_outcome},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An application store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What a guarded UPDATE/DELETE found when it touched no rows.
enum Miss {
  Absent,
  Resolved,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ApplicationStore impl ───────────────────────────────────────────────────

impl ApplicationStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, application: Application) -> Result<()> {
    let id = application.applicant_id;
    let form = application.form;
    let refs = application.refs;
    let expiry_at_str = encode_dt(application.expiry_at);
    let (thumbs_up, thumbs_down, outcome_str) = match application.verdict {
      Some(v) => (
        Some(v.thumbs_up),
        Some(v.thumbs_down),
        Some(encode_outcome(v.outcome)),
      ),
      None => (None, None, None),
    };

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO applications (
             applicant_id, full_name, email, target_username,
             motivation, favorite_aspect, secondary_link_a, secondary_link_b,
             discussion_thread_ref, vote_message_ref, source_message_ref,
             expiry_at, thumbs_up, thumbs_down, outcome
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
           ON CONFLICT (applicant_id) DO NOTHING",
          rusqlite::params![
            id.to_string(),
            form.full_name,
            form.email,
            form.target_username,
            form.motivation,
            form.favorite_aspect,
            form.secondary_link_a,
            form.secondary_link_b,
            refs.discussion_thread.to_string(),
            refs.vote_message.to_string(),
            refs.source_message.to_string(),
            expiry_at_str,
            thumbs_up,
            thumbs_down,
            outcome_str,
          ],
        )?;
        Ok(changed == 1)
      })
      .await?;

    if !inserted {
      return Err(warden_core::Error::DuplicateApplication(id).into());
    }
    Ok(())
  }

  async fn get(&self, applicant_id: ApplicantId) -> Result<Option<Application>> {
    let id_str = applicant_id.to_string();

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM applications WHERE applicant_id = ?1"),
              rusqlite::params![id_str],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplication::into_application).transpose()
  }

  async fn list_all(&self) -> Result<Vec<Application>> {
    let raws: Vec<RawApplication> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM applications"))?;
        let rows = stmt
          .query_map([], RawApplication::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApplication::into_application).collect()
  }

  async fn record_outcome(
    &self,
    applicant_id: ApplicantId,
    verdict: Verdict,
  ) -> Result<()> {
    let id_str = applicant_id.to_string();
    let outcome_str = encode_outcome(verdict.outcome);

    let miss: Option<Miss> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE applications
             SET thumbs_up = ?2, thumbs_down = ?3, outcome = ?4
           WHERE applicant_id = ?1 AND outcome IS NULL",
          rusqlite::params![id_str, verdict.thumbs_up, verdict.thumbs_down, outcome_str],
        )?;

        let miss = if changed == 1 {
          None
        } else {
          let exists = tx
            .query_row(
              "SELECT 1 FROM applications WHERE applicant_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          Some(if exists { Miss::Resolved } else { Miss::Absent })
        };

        tx.commit()?;
        Ok(miss)
      })
      .await?;

    match miss {
      None => Ok(()),
      Some(Miss::Absent) => {
        Err(warden_core::Error::ApplicationNotFound(applicant_id).into())
      }
      Some(Miss::Resolved) => {
        Err(warden_core::Error::AlreadyResolved(applicant_id).into())
      }
    }
  }

  async fn delete(&self, applicant_id: ApplicantId) -> Result<()> {
    let id_str = applicant_id.to_string();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM applications WHERE applicant_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(warden_core::Error::ApplicationNotFound(applicant_id).into());
    }
    Ok(())
  }
}
