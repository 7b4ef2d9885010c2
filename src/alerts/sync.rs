//! Reconciliation of posted notifications against active alerts.
//!
//! This module provides the [`AlertSync`] struct, which drives one sync
//! cycle: diff the tracked alerts against a fresh snapshot, post a webhook
//! message for every newly active alert, delete the message of every alert
//! that expired, and update the tracker as operations succeed.

use futures::future::join_all;
use log::{debug, error, info, warn};

use crate::alerts::tracker::{AlertTracker, TrackedAlert};
use crate::discord::{Channel, ChannelError, embed};
use crate::nws::Alert;

/// Keeps a notification channel in sync with the set of active alerts.
///
/// Owns the [`Channel`] implementation and the [`AlertTracker`]. Within a
/// cycle all posts and deletes run concurrently; their identities are
/// disjoint by construction of the diff, so no two operations ever touch
/// the same alert. Tracker updates are applied after the fan-in, on the
/// single task driving the cycle, so the tracker needs no locking.
///
/// Failed operations are not retried within the cycle: a failed post leaves
/// the alert untracked and it comes back as new on the next diff, a failed
/// delete leaves the entry tracked and it comes back as expired. A delete
/// whose target is already gone counts as success.
///
/// # Examples
///
/// ```no_run
/// let mut sync = AlertSync::new(WebhookClient::new(&webhook_url));
/// sync.sync(&active_alerts).await;
/// ```
pub struct AlertSync<C: Channel> {
    /// Channel the notifications are posted to
    channel: C,
    /// Alerts with a currently posted notification
    tracker: AlertTracker,
}

impl<C: Channel> AlertSync<C> {
    /// Create a new [AlertSync] with an empty tracker.
    ///
    /// # Arguments
    ///
    /// * `channel` - An implementation of the [Channel] trait to post to.
    pub fn new(channel: C) -> Self {
        AlertSync {
            channel,
            tracker: AlertTracker::new(),
        }
    }

    /// True iff any tracked alert is urgent. Drives the polling cadence.
    pub fn has_urgent(&self) -> bool {
        self.tracker.has_urgent()
    }

    /// Runs one reconciliation cycle against a snapshot of active alerts.
    ///
    /// Returns only after every launched post and delete has resolved,
    /// successfully or not, so cycles never overlap. An empty diff does
    /// nothing.
    pub async fn sync(&mut self, active: &[Alert]) {
        let (new_alerts, expired_alerts) = self.tracker.diff(active);

        if new_alerts.is_empty() && expired_alerts.is_empty() {
            debug!("nothing to sync");
            return;
        }

        let operations = new_alerts.len() + expired_alerts.len();

        let deletes = join_all(
            expired_alerts
                .into_iter()
                .map(|tracked| Self::delete_alert(&self.channel, tracked)),
        );
        let posts = join_all(
            new_alerts
                .into_iter()
                .map(|alert| Self::post_alert(&self.channel, alert)),
        );
        let (deleted, posted) = futures::join!(deletes, posts);

        for id in deleted.into_iter().flatten() {
            self.tracker.forget(&id);
        }
        for (alert, message_id) in posted.into_iter().flatten() {
            self.tracker.record(alert, message_id);
        }

        info!("synced {} alert messages", operations);
        debug!("tracking {} alerts", self.tracker.len());
    }

    /// Posts the notification for a new alert.
    ///
    /// Returns the alert and its message handle on success so the caller
    /// can record it. On failure the alert stays untracked and is retried
    /// as new on the next cycle.
    async fn post_alert(channel: &C, alert: Alert) -> Option<(Alert, String)> {
        let message = embed::alert_message(&alert);
        match channel.post(&message).await {
            Ok(message_id) => {
                info!("posted: {}", alert.id);
                Some((alert, message_id))
            }
            Err(e) => {
                error!("failed to post alert {}: {}", alert.id, e);
                None
            }
        }
    }

    /// Deletes the notification of an expired alert.
    ///
    /// Returns the alert id to forget on success. A missing target means
    /// the channel already matches intent and counts as success; any other
    /// failure leaves the entry tracked for retry on the next cycle.
    async fn delete_alert(channel: &C, tracked: TrackedAlert) -> Option<String> {
        match channel.delete(&tracked.message_id).await {
            Ok(()) => {
                info!("deleted: {}", tracked.alert.id);
                Some(tracked.alert.id)
            }
            Err(ChannelError::NotFound) => {
                warn!(
                    "webhook message missing when deleting alert: {}",
                    tracked.alert.event
                );
                Some(tracked.alert.id)
            }
            Err(e) => {
                error!("failed to delete alert {}: {}", tracked.alert.id, e);
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn tracker_mut(&mut self) -> &mut AlertTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::MockChannel;
    use crate::nws::{Severity, Urgency};

    fn test_alert(id: &str, severity: Severity, urgency: Urgency) -> Alert {
        Alert {
            id: id.to_string(),
            event: "Severe Thunderstorm Warning".to_string(),
            headline: Some(format!("Severe Thunderstorm Warning {}", id)),
            description: Some("Damaging winds expected.".to_string()),
            instruction: None,
            response: None,
            sender_name: Some("NWS Twin Cities MN".to_string()),
            severity,
            urgency,
            sent: None,
            onset: None,
            ends: None,
            nws_headline: None,
            wmo_office: None,
        }
    }

    fn transport_error() -> ChannelError {
        // A builder error is the cheapest reqwest::Error to make in a test
        ChannelError::Transport(
            reqwest::Client::new()
                .get("this is not a url")
                .build()
                .unwrap_err(),
        )
    }

    #[tokio::test]
    async fn test_new_alert_is_posted_and_tracked() {
        let mut channel = MockChannel::new();
        channel
            .expect_post()
            .withf(|message| message.content == "Severe Thunderstorm Warning x")
            .times(1)
            .returning(|_| Ok("m1".to_string()));

        let mut sync = AlertSync::new(channel);
        let active = vec![test_alert("x", Severity::Extreme, Urgency::Immediate)];
        sync.sync(&active).await;

        assert_eq!(sync.tracker.len(), 1);
        assert!(sync.tracker.contains("x"));
        assert!(sync.has_urgent());
    }

    #[tokio::test]
    async fn test_expired_alert_is_deleted_and_forgotten() {
        let mut channel = MockChannel::new();
        channel
            .expect_delete()
            .with(mockall::predicate::eq("m1"))
            .times(1)
            .returning(|_| Ok(()));

        let mut sync = AlertSync::new(channel);
        sync.tracker.record(
            test_alert("x", Severity::Moderate, Urgency::Expected),
            "m1".to_string(),
        );

        sync.sync(&[]).await;

        assert!(sync.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_alert_makes_no_channel_calls() {
        // No expectations: any post or delete would panic
        let channel = MockChannel::new();

        let mut sync = AlertSync::new(channel);
        let alert = test_alert("x", Severity::Moderate, Urgency::Expected);
        sync.tracker.record(alert.clone(), "m1".to_string());

        sync.sync(&[alert]).await;

        assert_eq!(sync.tracker.len(), 1);
        assert!(sync.tracker.contains("x"));
    }

    #[tokio::test]
    async fn test_failed_post_retried_next_cycle() {
        let mut channel = MockChannel::new();
        channel
            .expect_post()
            .times(2)
            .returning(|_| Err(transport_error()));

        let mut sync = AlertSync::new(channel);
        let active = vec![test_alert("y", Severity::Severe, Urgency::Expected)];

        sync.sync(&active).await;
        assert!(sync.tracker.is_empty());

        // The alert is still untracked, so the next cycle posts it again
        sync.sync(&active).await;
        assert!(sync.tracker.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_retried_next_cycle() {
        let mut channel = MockChannel::new();
        channel
            .expect_delete()
            .times(2)
            .returning(|_| Err(transport_error()));

        let mut sync = AlertSync::new(channel);
        sync.tracker.record(
            test_alert("z", Severity::Moderate, Urgency::Expected),
            "m1".to_string(),
        );

        sync.sync(&[]).await;
        assert!(sync.tracker.contains("z"));

        // Still tracked, so the next cycle tries the delete again
        sync.sync(&[]).await;
        assert!(sync.tracker.contains("z"));
    }

    #[tokio::test]
    async fn test_missing_delete_target_is_forgotten() {
        let mut channel = MockChannel::new();
        channel
            .expect_delete()
            .times(1)
            .returning(|_| Err(ChannelError::NotFound));

        let mut sync = AlertSync::new(channel);
        sync.tracker.record(
            test_alert("z", Severity::Moderate, Urgency::Expected),
            "m1".to_string(),
        );

        sync.sync(&[]).await;
        assert!(sync.tracker.is_empty());

        // Repeating the cycle produces no further delete attempt
        sync.sync(&[]).await;
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_sibling_successes() {
        let mut channel = MockChannel::new();
        channel
            .expect_post()
            .withf(|message| message.content.ends_with("ok"))
            .returning(|_| Ok("m-ok".to_string()));
        channel
            .expect_post()
            .withf(|message| message.content.ends_with("bad"))
            .returning(|_| Err(transport_error()));
        channel
            .expect_delete()
            .with(mockall::predicate::eq("m-old"))
            .times(1)
            .returning(|_| Ok(()));

        let mut sync = AlertSync::new(channel);
        sync.tracker.record(
            test_alert("old", Severity::Moderate, Urgency::Expected),
            "m-old".to_string(),
        );

        let active = vec![
            test_alert("ok", Severity::Moderate, Urgency::Expected),
            test_alert("bad", Severity::Moderate, Urgency::Expected),
        ];
        sync.sync(&active).await;

        assert!(sync.tracker.contains("ok"));
        assert!(!sync.tracker.contains("bad"));
        assert!(!sync.tracker.contains("old"));
    }
}
