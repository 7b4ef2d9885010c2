//! Webhook message presentation for alerts.
//!
//! This module builds the Discord webhook payload for an alert: the plain
//! message content plus a single rich embed carrying the alert details,
//! colored by severity and urgency.

use serde::Serialize;

use crate::nws::{Alert, Severity, Urgency};

/// Discord caps embed descriptions at 4096 characters.
const DESCRIPTION_LIMIT: usize = 4096;
/// Discord caps embed field values at 1024 characters.
const FIELD_VALUE_LIMIT: usize = 1024;

const COLOR_GOLD: u32 = 0xf1c40f;
const COLOR_DARK_GOLD: u32 = 0xc27c0e;
const COLOR_RED: u32 = 0xe74c3c;
const COLOR_DARK_RED: u32 = 0x992d22;

/// Response types that warrant surfacing the alert instructions.
const ACTION_RESPONSES: [&str; 3] = ["Evacuate", "Execute", "Shelter"];

/// Payload for executing a Discord webhook.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WebhookMessage {
    /// Plain message text above the embed.
    pub content: String,
    /// Display name override for the webhook, the issuing office.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// A single embed with the alert details.
    pub embeds: Vec<Embed>,
}

/// A Discord rich embed.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

/// A name/value field inside an embed.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Author line of an embed, linking to the issuing office page.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
}

/// Builds the webhook message for an alert.
///
/// The embed description carries the full alert text for `Immediate`
/// urgency (people should read everything), otherwise the shorter NWS
/// headline when one exists. Instructions are included only when the
/// response type calls for action.
pub fn alert_message(alert: &Alert) -> WebhookMessage {
    WebhookMessage {
        content: alert
            .headline
            .clone()
            .unwrap_or_else(|| alert.event.clone()),
        username: alert.sender_name.clone(),
        embeds: vec![alert_embed(alert)],
    }
}

fn alert_embed(alert: &Alert) -> Embed {
    let description = match &alert.nws_headline {
        Some(lines) if alert.urgency != Urgency::Immediate => lines.join("\n"),
        _ => truncate(alert.description.as_deref().unwrap_or_default(), DESCRIPTION_LIMIT),
    };

    let mut fields = Vec::new();

    if let (Some(instruction), Some(response)) = (&alert.instruction, &alert.response) {
        if ACTION_RESPONSES.contains(&response.as_str()) {
            fields.push(EmbedField {
                name: "Instructions".to_string(),
                value: truncate(&unwrap_newlines(instruction), FIELD_VALUE_LIMIT),
                inline: false,
            });
        }
    }

    fields.push(EmbedField {
        name: "Severity".to_string(),
        value: format!("{} - {}", alert.severity, alert.urgency),
        inline: true,
    });

    if let Some(onset) = alert.onset {
        fields.push(EmbedField {
            name: "Onset".to_string(),
            value: format!("<t:{}:R>", onset.timestamp()),
            inline: true,
        });
    }
    if let Some(ends) = alert.ends {
        fields.push(EmbedField {
            name: "Ends".to_string(),
            value: format!("<t:{}:R>", ends.timestamp()),
            inline: true,
        });
    }

    let author = match (&alert.wmo_office, &alert.sender_name) {
        (Some(office), Some(name)) => Some(EmbedAuthor {
            name: name.clone(),
            url: format!("https://www.weather.gov/{}", office.to_lowercase()),
        }),
        _ => None,
    };

    Embed {
        title: alert.event.clone(),
        url: format!("https://alerts.weather.gov/search?id={}", alert.id),
        description,
        color: alert_color(alert.severity, alert.urgency),
        timestamp: alert.sent.map(|sent| sent.to_rfc3339()),
        fields,
        author,
    }
}

/// Embed color keyed on severity and urgency; quieter alerts get none.
fn alert_color(severity: Severity, urgency: Urgency) -> Option<u32> {
    match (severity, urgency) {
        (Severity::Severe, Urgency::Immediate) => Some(COLOR_GOLD),
        (Severity::Severe, Urgency::Expected | Urgency::Future) => Some(COLOR_DARK_GOLD),
        (Severity::Extreme, Urgency::Immediate) => Some(COLOR_RED),
        (Severity::Extreme, Urgency::Expected | Urgency::Future) => Some(COLOR_DARK_RED),
        _ => None,
    }
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Joins hard-wrapped lines back into sentences, keeping paragraph breaks.
fn unwrap_newlines(text: &str) -> String {
    text.split("\n\n")
        .map(|paragraph| paragraph.replace('\n', " ").trim().to_string())
        .collect::<Vec<String>>()
        .join("\n\n")
        .trim()
        .to_string()
}
