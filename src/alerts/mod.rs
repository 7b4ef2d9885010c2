//! Alert reconciliation engine.
//!
//! This module keeps a Discord channel consistent with the set of active
//! weather alerts. It consists of two components:
//!
//! - [`AlertTracker`]: the in-memory map of alerts whose notifications are
//!   currently posted, with the new/expired diff
//! - [`AlertSync`]: one reconciliation cycle, fanning out webhook posts and
//!   deletes and updating the tracker as they succeed
//!
//! State lives only in memory: restarts forget everything and re-post the
//! alerts that are still active.

mod sync;
mod tracker;

pub use crate::alerts::sync::AlertSync;
pub use crate::alerts::tracker::{AlertTracker, TrackedAlert};
