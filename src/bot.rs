//! Bot module driving the fetch/reconcile/sleep loop.
//!
//! This module provides the main [`Bot`] implementation. The bot runs a
//! single control loop forever: fetch the active alerts for the configured
//! zones, reconcile the Discord channel against them, then sleep until the
//! next poll. Only one cycle is ever in flight; a cycle fully resolves
//! before the next fetch is issued.
//!
//! # Polling cadence
//!
//! The sleep duration adapts to what is being tracked. While any tracked
//! alert is urgent (Immediate urgency or Extreme severity) the bot polls
//! roughly every minute, otherwise every five minutes. A fresh random
//! jitter is subtracted from the base interval on every cycle so polling
//! never aligns with the upstream publication cadence:
//!
//! - urgent: 60s minus up to 10s of jitter (effective ~50-60s)
//! - relaxed: 300s minus up to 15s of jitter (effective ~285-300s)
//!
//! # Failure handling
//!
//! A failed fetch skips reconciliation entirely and keeps the tracked
//! state: a fetch error is not an empty snapshot, and treating it as one
//! would delete every posted notification. Failed posts and deletes are
//! retried naturally on later cycles through the diff.
//!
//! # Shutdown
//!
//! SIGINT/SIGTERM (or ctrl-c) terminates the loop cleanly. The signal is
//! observed at the sleep suspension point, so an in-progress cycle always
//! resolves before the loop exits and the tracker never diverges from the
//! channel.

use std::time::Duration;

use log::{error, info, warn};
use rand::Rng;
use tokio::time;

use crate::alerts::AlertSync;
use crate::config::Config;
use crate::discord::{Channel, WebhookClient};
use crate::nws::{NwsRequester, Requester};
use crate::zones;

/// Base poll interval while an urgent alert is tracked.
const URGENT_POLL_SECS: f64 = 60.0;
/// Jitter bound for the urgent interval.
const URGENT_JITTER_SECS: f64 = 10.0;
/// Base poll interval while nothing urgent is tracked.
const RELAXED_POLL_SECS: f64 = 300.0;
/// Jitter bound for the relaxed interval.
const RELAXED_JITTER_SECS: f64 = 15.0;

/// Main bot structure tying the alert source to the notification channel.
///
/// Generic over the [`Requester`] and [`Channel`] implementations so the
/// loop logic can be exercised with mocks.
///
/// # Examples
///
/// ```no_run
/// let config = Config::load("config.yaml")?;
/// let bot = Bot::new(config);
/// bot.start().await; // Runs until SIGINT/SIGTERM
/// ```
pub struct Bot<R: Requester, C: Channel> {
    /// Alert source
    requester: R,
    /// Reconciler owning the channel and the tracked alerts
    sync: AlertSync<C>,
    /// Path to the zone list file, re-read every cycle
    zones_path: String,
}

impl Bot<NwsRequester, WebhookClient> {
    /// Creates a new Bot from the loaded configuration.
    pub fn new(config: Config) -> Self {
        let requester = NwsRequester::new(&config.nws.url);
        let channel = WebhookClient::new(&config.discord.webhook_url);

        Bot {
            requester,
            sync: AlertSync::new(channel),
            zones_path: config.nws.zones_file,
        }
    }
}

impl<R: Requester, C: Channel> Bot<R, C> {
    /// Starts the bot and runs the poll loop until a shutdown signal.
    ///
    /// This method consumes `self` and only returns once SIGINT, SIGTERM
    /// or ctrl-c has been received during a sleep.
    pub async fn start(mut self) {
        info!("watching zones listed in {}", self.zones_path);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            self.run_cycle().await;

            let sleep_for = self.sleep_duration();
            info!("sleep timer: {:.1}s", sleep_for.as_secs_f64());

            tokio::select! {
                _ = time::sleep(sleep_for) => {}
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping");
                    break;
                }
            }
        }
    }

    /// Runs one fetch/reconcile cycle.
    async fn run_cycle(&mut self) {
        let zones = zones::load(&self.zones_path).await;
        if zones.is_empty() {
            warn!("no zones have been loaded from {}", self.zones_path);
            // Nothing to fetch; reconcile against an empty snapshot so
            // notifications for previously watched zones are retracted
            self.sync.sync(&[]).await;
            return;
        }

        match self.requester.fetch_active(&zones).await {
            Ok(active) => self.sync.sync(&active).await,
            // A failed fetch is not an empty snapshot: keep everything
            // tracked and retry on the next cycle
            Err(e) => error!("failed to fetch active alerts: {}", e),
        }
    }

    /// Computes the next sleep duration from the tracked urgency state.
    ///
    /// The jitter is uniformly distributed, redrawn every cycle and always
    /// subtracted from the base interval.
    fn sleep_duration(&self) -> Duration {
        let (base, jitter_bound) = if self.sync.has_urgent() {
            (URGENT_POLL_SECS, URGENT_JITTER_SECS)
        } else {
            (RELAXED_POLL_SECS, RELAXED_JITTER_SECS)
        };

        let jitter = rand::rng().random_range(0.0..jitter_bound);
        Duration::from_secs_f64(base - jitter)
    }
}

/// Completes when the process receives a termination signal.
///
/// On unix both SIGINT (ctrl-c) and SIGTERM are handled; elsewhere only
/// ctrl-c.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            warn!("could not install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
