//! Tracked-alert state for the reconciliation engine.
//!
//! This module provides the [`AlertTracker`], the in-memory map of alerts
//! whose notifications are currently posted. The tracker is the source of
//! truth for the diff between what the channel shows and what is actually
//! active; it holds no I/O and is mutated only by the reconciler, strictly
//! after the corresponding webhook operation succeeded.

use std::collections::{HashMap, HashSet};

use crate::nws::{Alert, Severity, Urgency};

/// An alert with a successfully posted notification.
///
/// Exists in the tracker if and only if the webhook message identified by
/// `message_id` was posted and has not yet been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedAlert {
    /// The alert as it looked when posted.
    pub alert: Alert,
    /// Handle of the webhook message carrying the notification.
    pub message_id: String,
}

/// Map of alert id to its posted notification.
///
/// Lives for the whole process and starts empty: after a restart every
/// still-active alert is simply posted again. Each id is tracked at most
/// once at any time.
///
/// # Examples
///
/// ```no_run
/// let mut tracker = AlertTracker::new();
/// let (new_alerts, expired_alerts) = tracker.diff(&active);
/// // ... post the new alerts, delete the expired ones ...
/// tracker.record(alert, message_id);
/// ```
#[derive(Debug, Default)]
pub struct AlertTracker {
    /// Tracked alerts keyed by alert id
    tracked: HashMap<String, TrackedAlert>,
}

impl AlertTracker {
    /// Create a new, empty [AlertTracker].
    pub fn new() -> Self {
        AlertTracker {
            tracked: HashMap::new(),
        }
    }

    /// Splits a snapshot of active alerts into new and expired sets.
    ///
    /// `new` contains the active alerts whose id is not yet tracked;
    /// `expired` contains the tracked entries whose id is absent from the
    /// snapshot. The comparison is by id only: an already-tracked alert
    /// whose content changed upstream is neither new nor expired, and its
    /// posted notification is left as-is. Pure function of the current map
    /// and the snapshot; no side effects.
    ///
    /// A snapshot listing the same id twice yields it once.
    pub fn diff(&self, active: &[Alert]) -> (Vec<Alert>, Vec<TrackedAlert>) {
        let active_ids: HashSet<&str> = active.iter().map(|alert| alert.id.as_str()).collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let new_alerts = active
            .iter()
            .filter(|alert| !self.tracked.contains_key(&alert.id) && seen.insert(&alert.id))
            .cloned()
            .collect();

        let expired_alerts = self
            .tracked
            .values()
            .filter(|tracked| !active_ids.contains(tracked.alert.id.as_str()))
            .cloned()
            .collect();

        (new_alerts, expired_alerts)
    }

    /// Starts tracking an alert whose notification was just posted.
    ///
    /// Must be called only after the post succeeded; `message_id` is the
    /// handle the post returned.
    pub fn record(&mut self, alert: Alert, message_id: String) {
        self.tracked
            .insert(alert.id.clone(), TrackedAlert { alert, message_id });
    }

    /// Stops tracking an alert whose notification is gone.
    ///
    /// Must be called only after the delete succeeded, or after the channel
    /// confirmed the message no longer exists.
    pub fn forget(&mut self, id: &str) -> Option<TrackedAlert> {
        self.tracked.remove(id)
    }

    /// True iff any tracked alert is urgent (Immediate urgency or Extreme
    /// severity). Only used to pick the polling cadence.
    pub fn has_urgent(&self) -> bool {
        self.tracked.values().any(|tracked| {
            tracked.alert.urgency == Urgency::Immediate
                || tracked.alert.severity == Severity::Extreme
        })
    }

    /// Number of tracked alerts.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// True iff nothing is tracked.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// True iff the given alert id is tracked.
    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.tracked.contains_key(id)
    }
}
