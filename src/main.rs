//! Nimbus - a Discord webhook bot for National Weather Service alerts.
//!
//! This is the main entry point for the nimbus bot, which mirrors the
//! currently active NWS alerts for a set of forecast zones into a Discord
//! channel through a webhook.
//!
//! # Overview
//!
//! Nimbus polls `api.weather.gov` for the active alerts in the zones listed
//! in a text file, posts a rich embed for every newly active alert, and
//! deletes the message again once the alert is no longer active. The channel
//! therefore always shows exactly the alerts that are in effect right now.
//!
//! # Features
//!
//! - **Live Mirror**: one webhook message per active alert, retracted on expiry
//! - **Adaptive Polling**: polls every minute while an urgent alert is up,
//!   every five minutes otherwise, with jitter on every cycle
//! - **Zone Scoping**: watches only the NWS zones listed in the zone file,
//!   which is re-read every cycle
//! - **Severity Filter**: only Moderate and worse (or Unknown) severities
//!   are fetched
//! - **Crash-Only State**: tracked alerts live in memory; a restart simply
//!   re-posts whatever is still active
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings:
//!
//! ```yaml
//! discord:
//!   webhook_url: "https://discord.com/api/webhooks/123/abc"
//!
//! nws:
//!   zones_file: "zones.txt"
//! ```
//!
//! Any value can be overridden with a `NIMBUS_` prefixed environment
//! variable, e.g. `NIMBUS_DISCORD__WEBHOOK_URL` for the webhook secret.
//! The zone file lists one NWS zone code per line; blank lines and `#`
//! comments are ignored:
//!
//! ```text
//! # Twin Cities metro
//! MNZ060
//! MNZ061
//! ```
//!
//! # Usage
//!
//! ```bash
//! nimbus --config config.yaml
//! ```
//!
//! # Architecture
//!
//! The bot consists of several modules:
//!
//! - [`alerts`] - Tracked-alert state and the reconciliation cycle
//! - [`bot`] - The fetch/reconcile/sleep control loop
//! - [`config`] - YAML configuration loading with environment overrides
//! - [`discord`] - Webhook transport and embed presentation
//! - [`nws`] - NWS API client and alert data model
//! - [`zones`] - Zone-code list file loading
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod alerts;
mod bot;
mod config;
mod discord;
mod nws;
mod zones;

/// Command-line arguments for the nimbus bot.
///
/// Everything else is configured through the YAML file (see
/// [`config::Config`]) and its environment overrides.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

/// Main entry point for the nimbus bot.
///
/// Initializes the logger (`info` level unless `RUST_LOG` overrides it),
/// parses the command line, loads the configuration and runs the bot loop
/// until a shutdown signal arrives.
///
/// A configuration error - most importantly a missing webhook URL - is
/// fatal: it is logged and the process exits without starting the loop.
#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("starting nimbus {}...", env!("CARGO_PKG_VERSION"));

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration from YAML file with environment variable overrides
    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("failed to load config file: {:#}", e);
            return;
        }
    };

    // Launch bot
    let bot = Bot::new(config);
    bot.start().await;
}
