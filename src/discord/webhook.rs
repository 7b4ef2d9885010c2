//! HTTP client for executing and deleting Discord webhook messages.
//!
//! This module provides the [`WebhookClient`] struct implementing the
//! [`Channel`] trait over a Discord webhook URL.

use log::debug;
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::discord::ChannelError;
use crate::discord::embed::WebhookMessage;

/// Response from executing a webhook with `wait=true`.
#[derive(Deserialize, Debug)]
struct ExecutionResponse {
    /// Snowflake id of the created message.
    id: String,
}

/// A channel that notifications can be posted to and retracted from.
///
/// This trait abstracts the webhook operations for easier testing with mocks.
#[automock]
pub trait Channel {
    /// Posts a message, returning the handle needed to delete it later.
    async fn post(&self, message: &WebhookMessage) -> Result<String, ChannelError>;
    /// Deletes a previously posted message by its handle.
    async fn delete(&self, message_id: &str) -> Result<(), ChannelError>;
}

/// Discord webhook client.
///
/// # Examples
///
/// ```no_run
/// let webhook = WebhookClient::new("https://discord.com/api/webhooks/123/token");
/// let message_id = webhook.post(&message).await?;
/// webhook.delete(&message_id).await?;
/// ```
pub struct WebhookClient {
    /// Webhook URL, including the token
    url: String,
    /// HTTP client
    client: Client,
}

impl WebhookClient {
    /// Create a new [WebhookClient].
    ///
    /// # Arguments
    ///
    /// * `url` - The full Discord webhook URL.
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::new();
        WebhookClient {
            url: url.to_string(),
            client,
        }
    }
}

impl Channel for WebhookClient {
    /// Execute the webhook with `wait=true` so Discord returns the created
    /// message, and hand back its id.
    async fn post(&self, message: &WebhookMessage) -> Result<String, ChannelError> {
        debug!("execute webhook: {}", message.content);

        let execution: ExecutionResponse = self
            .client
            .post(&self.url)
            .query(&[("wait", "true")])
            .json(message)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("webhook message {} created", execution.id);

        Ok(execution.id)
    }

    /// Request `DELETE <webhook>/messages/{id}`.
    ///
    /// A 404 means the message is already gone and maps to
    /// [`ChannelError::NotFound`] so the caller can treat it as an
    /// idempotent success.
    async fn delete(&self, message_id: &str) -> Result<(), ChannelError> {
        let url = format!("{}/messages/{}", &self.url, message_id);
        debug!("delete webhook message {}", message_id);

        let response = self.client.delete(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChannelError::NotFound);
        }
        response.error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::embed::alert_message;
    use crate::nws::{Alert, Severity, Urgency};

    fn test_message() -> WebhookMessage {
        alert_message(&Alert {
            id: "alert1".to_string(),
            event: "Tornado Warning".to_string(),
            headline: Some("Tornado Warning for Hennepin County".to_string()),
            description: Some("A tornado has been spotted.".to_string()),
            instruction: None,
            response: Some("Shelter".to_string()),
            sender_name: Some("NWS Twin Cities MN".to_string()),
            severity: Severity::Extreme,
            urgency: Urgency::Immediate,
            sent: None,
            onset: None,
            ends: None,
            nws_headline: None,
            wmo_office: None,
        })
    }

    #[tokio::test]
    async fn test_post_returns_message_id() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("POST", "/")
            .match_query(mockito::Matcher::UrlEncoded(
                "wait".to_owned(),
                "true".to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "111222333", "channel_id": "444"}"#)
            .create_async()
            .await;

        let webhook = WebhookClient::new(&url);
        let message_id = webhook.post(&test_message()).await.unwrap();
        assert_eq!(message_id, "111222333");
    }

    #[tokio::test]
    async fn test_post_http_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("POST", "/")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let webhook = WebhookClient::new(&url);
        let result = webhook.post(&test_message()).await;
        assert!(matches!(result, Err(ChannelError::Transport(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("DELETE", "/messages/111222333")
            .with_status(204)
            .create_async()
            .await;

        let webhook = WebhookClient::new(&url);
        webhook.delete("111222333").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_missing_message_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("DELETE", "/messages/111222333")
            .with_status(404)
            .create_async()
            .await;

        let webhook = WebhookClient::new(&url);
        let result = webhook.delete("111222333").await;
        assert!(matches!(result, Err(ChannelError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_http_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        server
            .mock("DELETE", "/messages/111222333")
            .with_status(500)
            .create_async()
            .await;

        let webhook = WebhookClient::new(&url);
        let result = webhook.delete("111222333").await;
        assert!(matches!(result, Err(ChannelError::Transport(_))));
    }
}
