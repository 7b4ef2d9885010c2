//! Internal data structures for representing NWS alerts.
//!
//! This module defines the alert model used throughout the bot, decoupled
//! from the wire format in [`response_structs`](crate::nws::response_structs).
//! Conversion normalizes the loosely formatted API payload: severity and
//! urgency strings become enums, ISO-8601 strings become timestamps, and the
//! few CAP parameters the bot cares about are pulled out of the parameter map.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::nws::response_structs::AlertProperties;

/// Runs of four or more whitespace characters, which the NWS uses as an
/// ad-hoc list separator inside description text.
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{4,}").unwrap());

/// CAP urgency of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Responsive action should be taken immediately.
    Immediate,
    /// Responsive action should be taken soon (within the next hour).
    Expected,
    /// Responsive action should be taken in the near future.
    Future,
    /// Urgency not known or not provided.
    Unknown,
}

impl Urgency {
    /// Parses the CAP urgency string, falling back to [`Urgency::Unknown`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("Immediate") => Urgency::Immediate,
            Some("Expected") => Urgency::Expected,
            Some("Future") => Urgency::Future,
            Some("Unknown") | None => Urgency::Unknown,
            Some(other) => {
                warn!("unknown urgency value: {}", other);
                Urgency::Unknown
            }
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            Urgency::Immediate => "Immediate",
            Urgency::Expected => "Expected",
            Urgency::Future => "Future",
            Urgency::Unknown => "Unknown",
        };
        write!(f, "{}", value)
    }
}

/// CAP severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Extraordinary threat to life or property.
    Extreme,
    /// Significant threat to life or property.
    Severe,
    /// Possible threat to life or property.
    Moderate,
    /// Severity not known or not provided.
    Unknown,
}

impl Severity {
    /// Parses the CAP severity string, falling back to [`Severity::Unknown`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("Extreme") => Severity::Extreme,
            Some("Severe") => Severity::Severe,
            Some("Moderate") => Severity::Moderate,
            Some("Unknown") | None => Severity::Unknown,
            Some(other) => {
                warn!("unknown severity value: {}", other);
                Severity::Unknown
            }
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            Severity::Extreme => "Extreme",
            Severity::Severe => "Severe",
            Severity::Moderate => "Moderate",
            Severity::Unknown => "Unknown",
        };
        write!(f, "{}", value)
    }
}

/// An active weather alert.
///
/// Built from [`AlertProperties`] via [`From`]; one value per alert per
/// polling cycle. The `id` is the only field the reconciliation logic keys
/// on, everything else feeds the webhook message presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Stable identifier, unique per reported event.
    pub id: String,
    /// Event name, e.g. `Winter Storm Warning`.
    pub event: String,
    /// One-line summary of the alert.
    pub headline: Option<String>,
    /// Full descriptive text, with whitespace-run separators normalized.
    pub description: Option<String>,
    /// Recommended actions for the public.
    pub instruction: Option<String>,
    /// CAP response type, e.g. `Shelter` or `Monitor`.
    pub response: Option<String>,
    /// Issuing office display name.
    pub sender_name: Option<String>,
    /// Parsed CAP severity.
    pub severity: Severity,
    /// Parsed CAP urgency.
    pub urgency: Urgency,
    /// Time the alert was sent.
    pub sent: Option<DateTime<FixedOffset>>,
    /// Expected onset of the event.
    pub onset: Option<DateTime<FixedOffset>>,
    /// Expected end of the event.
    pub ends: Option<DateTime<FixedOffset>>,
    /// Lines of the `NWSheadline` parameter, when present and non-empty.
    pub nws_headline: Option<Vec<String>>,
    /// Three-letter issuing office code from the `WMOidentifier` parameter.
    pub wmo_office: Option<String>,
}

impl From<AlertProperties> for Alert {
    fn from(properties: AlertProperties) -> Self {
        let severity = Severity::parse(properties.severity.as_deref());
        let urgency = Urgency::parse(properties.urgency.as_deref());

        let description = properties
            .description
            .map(|text| WHITESPACE_RUNS.replace_all(&text, ", ").trim().to_string());

        let nws_headline = properties
            .parameters
            .get("NWSheadline")
            .and_then(|value| value.as_array())
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(|line| line.as_str())
                    .map(str::to_owned)
                    .collect::<Vec<String>>()
            })
            .filter(|lines| !lines.is_empty());

        let wmo_office = properties
            .parameters
            .get("WMOidentifier")
            .and_then(|value| value.as_array())
            .and_then(|values| values.first())
            .and_then(|value| value.as_str())
            .and_then(office_code);

        Alert {
            id: properties.id,
            event: properties.event,
            headline: properties.headline,
            description,
            instruction: properties.instruction,
            response: properties.response,
            sender_name: properties.sender_name,
            severity,
            urgency,
            sent: parse_timestamp(properties.sent.as_deref()),
            onset: parse_timestamp(properties.onset.as_deref()),
            ends: parse_timestamp(properties.ends.as_deref()),
            nws_headline,
            wmo_office,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, event={}, severity={}, urgency={}",
            self.id, self.event, self.severity, self.urgency
        )
    }
}

/// Parses an ISO-8601 timestamp, returning `None` for absent or malformed
/// values.
fn parse_timestamp(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => Some(timestamp),
        Err(e) => {
            warn!("unparseable timestamp {}: {}", value, e);
            None
        }
    }
}

/// Extracts the issuing office code from a WMO identifier.
///
/// The identifier looks like `WWUS43 KMPX 101521`; the office code is the
/// trailing three letters of the second token.
fn office_code(identifier: &str) -> Option<String> {
    let station = identifier.split_whitespace().nth(1)?;
    let chars: Vec<char> = station.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    Some(chars[chars.len() - 3..].iter().collect())
}
