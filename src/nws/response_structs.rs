//! Response structures for the NWS alerts API.
//!
//! This module contains structures for deserializing the GeoJSON responses
//! returned by `api.weather.gov`. Every nullable field in the payload is
//! declared as an `Option` up front; the free-form `parameters` object is
//! kept as a typed map of JSON values and mined for the few entries the
//! bot actually uses.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Top-level GeoJSON feature collection from `/alerts/active`.
#[derive(Deserialize, Debug)]
pub struct AlertCollection {
    /// One feature per active alert.
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

impl fmt::Display for AlertCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "features={}", self.features.len())
    }
}

/// A single GeoJSON feature wrapping one alert.
#[derive(Deserialize, Debug)]
pub struct AlertFeature {
    /// The alert payload; geometry is ignored.
    pub properties: AlertProperties,
}

/// Properties of an alert from `/alerts/active`.
///
/// Field names follow the CAP-derived camelCase keys of the API. Fields the
/// API may omit or send as `null` are `Option`s; a type mismatch fails the
/// whole decode rather than silently attaching arbitrary data.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    /// Stable identifier for the alert, unique per reported event.
    pub id: String,
    /// Event name, e.g. `Winter Storm Warning`.
    pub event: String,
    /// One-line summary of the alert.
    pub headline: Option<String>,
    /// Full descriptive text.
    pub description: Option<String>,
    /// Recommended actions for the public.
    pub instruction: Option<String>,
    /// CAP response type, e.g. `Shelter` or `Monitor`.
    pub response: Option<String>,
    /// Issuing office display name, e.g. `NWS Twin Cities MN`.
    pub sender_name: Option<String>,
    /// CAP severity, e.g. `Extreme`.
    pub severity: Option<String>,
    /// CAP urgency, e.g. `Immediate`.
    pub urgency: Option<String>,
    /// ISO-8601 time the alert was sent.
    pub sent: Option<String>,
    /// ISO-8601 expected onset of the event.
    pub onset: Option<String>,
    /// ISO-8601 expected end of the event.
    pub ends: Option<String>,
    /// Free-form CAP parameters, e.g. `NWSheadline` and `WMOidentifier`.
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
}

impl fmt::Display for AlertProperties {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id={}, event={}, severity={:?}, urgency={:?}",
            self.id, self.event, self.severity, self.urgency
        )
    }
}
