//! Slack incoming-webhook sink.

use crate::{Notifier, NotifyError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use suspendwatch_types::ChangeEvent;
use tracing::debug;

/// Slack webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackWebhook {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

/// Attachment forming part of a [`SlackWebhook`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackAttachment {
    pub color: String,
    pub author_name: String,
    pub text: String,
    pub mrkdwn_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SlackAttachmentField>,
}

/// Field within a [`SlackAttachment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackAttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl SlackWebhook {
    /// Format a change event as a single colored attachment.
    pub fn for_event(event: &ChangeEvent) -> Self {
        let color = if event.suspended { "danger" } else { "good" };
        let kind = event
            .resource
            .resource_type
            .kind
            .strip_suffix('s')
            .unwrap_or(&event.resource.resource_type.kind);

        Self {
            attachments: vec![SlackAttachment {
                color: color.to_string(),
                author_name: format!(
                    "{}/{}.{}",
                    kind, event.resource.name, event.resource.namespace
                ),
                text: format!("{} by {}", event.action(), event.acting_principal),
                mrkdwn_in: vec!["text".to_string()],
                fields: vec![SlackAttachmentField {
                    title: "project".to_string(),
                    value: event.cluster_context_id.clone(),
                    short: false,
                }],
            }],
        }
    }
}

/// Sends notifications to Slack via an incoming webhook.
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// Create a notifier posting to `webhook_url`, giving up on each request
    /// after `timeout`.
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let webhook_url = webhook_url.into();
        if webhook_url.is_empty() {
            return Err(NotifyError::EmptyWebhookUrl);
        }

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(format!("suspendwatch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NotifyError::ClientBuild)?;

        Ok(Self {
            client,
            webhook_url,
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        let payload = SlackWebhook::for_event(event);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(resource = %event.resource, "slack notification delivered");
        Ok(())
    }
}
