//! The application review lifecycle: intake of new submissions, the
//! resolution engine, and the periodic sweep that drives it.
//!
//! Everything is generic over the [`ApplicationStore`], [`ChatPlatform`] and
//! [`Whitelist`] contracts from `warden-core`, bundled into one
//! [`ReviewContext`] that is built once at startup and shared by the inbound
//! event handler and the [`Scheduler`].
//!
//! [`ApplicationStore`]: warden_core::store::ApplicationStore
//! [`ChatPlatform`]: warden_core::platform::ChatPlatform
//! [`Whitelist`]: warden_core::platform::Whitelist

mod context;
pub mod error;
mod intake;
pub mod notice;
mod resolve;
mod scheduler;
mod settings;
mod sweep;

pub use context::ReviewContext;
pub use error::{Error, Result};
pub use resolve::{Effects, Resolution};
pub use scheduler::Scheduler;
pub use settings::ReviewSettings;
pub use sweep::SweepReport;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;
