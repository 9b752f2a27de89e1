//! The `ApplicationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `warden-store-sqlite`).
//! The review engine depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  application::{ApplicantId, Application},
  tally::Verdict,
};

/// Durable table of pending applications, keyed by applicant.
///
/// Every operation is atomic for a single record; nothing spans records.
///
/// All methods return `Send` futures so the trait can be used from tasks on
/// a multi-threaded runtime.
pub trait ApplicationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new application. Fails if one is already stored for the same
  /// applicant.
  fn insert(
    &self,
    application: Application,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a single application. Returns `None` if not found.
  fn get(
    &self,
    applicant_id: ApplicantId,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  /// Every stored application, in no particular order.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + '_;

  /// Stamp the verdict on an application.
  ///
  /// Fails if the application does not exist or already carries a verdict;
  /// the three verdict columns are written together, once.
  fn record_outcome(
    &self,
    applicant_id: ApplicantId,
    verdict: Verdict,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retire an application. Fails if it does not exist.
  fn delete(
    &self,
    applicant_id: ApplicantId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
