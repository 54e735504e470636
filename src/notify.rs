//! Progress notifications
//!
//! Messages are posted to a chat webhook as JSON. Delivery is best-effort:
//! one attempt, no retry, and failures never reach the caller.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::common::config::NotifyConfig;

/// Sends short status messages somewhere a human will see them
#[async_trait]
pub trait Notifier: fmt::Debug + Send + Sync {
    async fn notify(&self, message: &str);
}

/// Build the notifier described by the configuration
///
/// Returns a [`NullNotifier`] when notifications are disabled, no endpoint
/// is configured, or the HTTP client cannot be built.
pub fn from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    if !config.enabled {
        tracing::debug!("Notifications disabled");
        return Arc::new(NullNotifier);
    }
    let Some(endpoint) = config.endpoint.clone() else {
        tracing::info!("No notification endpoint configured, notifications will be skipped");
        return Arc::new(NullNotifier);
    };

    match WebhookNotifier::new(
        endpoint,
        config.channel.clone(),
        config.sender.clone(),
        Duration::from_secs(config.timeout_secs),
    ) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::warn!(error = %e, "Could not build HTTP client, notifications will be skipped");
            Arc::new(NullNotifier)
        }
    }
}

/// JSON body accepted by Slack-style incoming webhooks
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    username: &'a str,
    text: &'a str,
}

/// Posts messages to an incoming-webhook endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    channel: String,
    sender: String,
}

impl WebhookNotifier {
    pub fn new(
        endpoint: String,
        channel: String,
        sender: String,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("regress")
            .build()?;
        Ok(Self {
            client,
            endpoint,
            channel,
            sender,
        })
    }

    fn payload<'a>(&'a self, message: &'a str) -> WebhookPayload<'a> {
        WebhookPayload {
            channel: &self.channel,
            username: &self.sender,
            text: message,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) {
        tracing::debug!(text = message, "Posting notification");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(message))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), text = message, "Notification rejected by endpoint")
            }
            Err(e) => tracing::warn!(error = %e, text = message, "Notification could not be delivered"),
        }
    }
}

/// Discards messages, logging them at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, message: &str) {
        tracing::debug!(text = message, "Notification skipped");
    }
}
