//! HTTP client for the National Weather Service alerts API.
//!
//! This module provides the [`NwsRequester`] struct for fetching the set of
//! currently active alerts from `api.weather.gov`.

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, Error, header};

use crate::nws::response_structs::AlertCollection;
use crate::nws::structs::Alert;

/// Severities worth posting. `Minor` alerts are filtered out server-side.
const SEVERITY_FILTER: &str = "Moderate,Severe,Extreme,Unknown";

/// Identifying user agent, required by the NWS API terms of service.
const USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"), " | Discord weather bot");

/// HTTP client for requesting active alerts from the NWS API.
///
/// # Examples
///
/// ```no_run
/// let requester = NwsRequester::new("https://api.weather.gov");
/// let alerts = requester.fetch_active(&zones).await.unwrap();
/// println!("{} active alerts", alerts.len());
/// ```
pub struct NwsRequester {
    /// Base URL of the NWS API
    url: String,
    /// HTTP client
    client: Client,
}

/// Trait for fetching active alerts.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Requester {
    /// Fetches the currently active alerts for the given zone codes.
    async fn fetch_active(&self, zones: &[String]) -> Result<Vec<Alert>, Error>;
}

impl NwsRequester {
    /// Create a new [NwsRequester].
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the NWS API.
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::new();
        NwsRequester {
            url: url.to_string(),
            client,
        }
    }
}

impl Requester for NwsRequester {
    /// Request `/alerts/active` for the configured zones.
    ///
    /// The request is scoped to the given zone codes and to the severities in
    /// [`SEVERITY_FILTER`]. The GeoJSON response is decoded into [`Alert`]
    /// values and sorted by (onset, sent) ascending; the ordering is only
    /// used for display so that earlier alerts are posted first.
    ///
    /// # Arguments
    ///
    /// * `zones` - NWS zone codes, e.g. `MNZ060`.
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success HTTP status is returned as a
    /// [`reqwest::Error`]; the caller decides whether to skip the cycle.
    async fn fetch_active(&self, zones: &[String]) -> Result<Vec<Alert>, Error> {
        let url = format!("{}/alerts/active", &self.url);
        let zone_filter = zones.join(",");
        info!("request active alerts for {} zones", zones.len());
        debug!(
            "request {}?zone={}&severity={}",
            &url, &zone_filter, SEVERITY_FILTER
        );

        let collection: AlertCollection = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(&[
                ("zone", zone_filter.as_str()),
                ("severity", SEVERITY_FILTER),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut alerts: Vec<Alert> = collection
            .features
            .into_iter()
            .map(|feature| Alert::from(feature.properties))
            .collect();
        alerts.sort_by_key(|alert| (alert.onset, alert.sent));

        debug!("response from {} -> {} active alerts", &url, alerts.len());

        Ok(alerts)
    }
}
