//! National Weather Service API integration.
//!
//! This module provides the alert source for the bot: an HTTP client for the
//! `api.weather.gov` alerts endpoint and the data structures representing
//! active alerts.
//!
//! # Modules
//!
//! - `requester` - HTTP client fetching active alerts
//! - `response_structs` - Wire structures for the GeoJSON API responses
//! - `structs` - Internal alert model with parsed severity, urgency and
//!   timestamps

mod requester;
mod response_structs;
mod structs;

pub use crate::nws::requester::{NwsRequester, Requester};
#[cfg(test)]
pub use crate::nws::requester::MockRequester;
pub use crate::nws::structs::{Alert, Severity, Urgency};
