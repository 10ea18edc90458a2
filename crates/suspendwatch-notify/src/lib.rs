//! Change notification sinks.
//!
//! Every sink implements [`Notifier`]. [`FilteringNotifier`] and
//! [`MultiNotifier`] compose sinks: the first drops events that do not match a
//! [`NotificationFilter`], the second fans an event out to several sinks.

mod filter;
mod multi;
mod slack;

pub use filter::{FilteringNotifier, NotificationFilter};
pub use multi::MultiNotifier;
pub use slack::{SlackAttachment, SlackAttachmentField, SlackNotifier, SlackWebhook};

use async_trait::async_trait;
use std::sync::Arc;
use suspendwatch_types::ChangeEvent;
use thiserror::Error;

/// Notification errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("empty webhook url supplied")]
    EmptyWebhookUrl,

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("send request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code: {status}")]
    Status { status: u16, body: String },

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] regex::Error),
}

/// A destination for change events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        (**self).notify(event).await
    }
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
    async fn notify(&self, event: &ChangeEvent) -> Result<(), NotifyError> {
        (**self).notify(event).await
    }
}
