//! The streaming seam under the tailer.

use crate::proto::{LogEntry, TailLogEntriesRequest};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client could not be constructed at all.
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// Credentials could not be obtained.
    #[error("failed to obtain credentials: {0}")]
    Auth(String),

    /// The stream was opened or terminated with a gRPC status.
    #[error("stream terminated: {0}")]
    Status(#[from] tonic::Status),
}

/// Parameters of a single tail session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRequest {
    pub resource_names: Vec<String>,
    pub filter: String,
}

impl From<&TailRequest> for TailLogEntriesRequest {
    fn from(request: &TailRequest) -> Self {
        Self {
            resource_names: request.resource_names.clone(),
            filter: request.filter.clone(),
            buffer_window: None,
        }
    }
}

/// Batches of entries pushed by the server, in arrival order.
pub type EntryStream = BoxStream<'static, Result<Vec<LogEntry>, TransportError>>;

/// Opens tail sessions.
#[async_trait]
pub trait TailTransport: Send + Sync {
    /// Start a session. The returned stream ends when the server closes it.
    async fn open(&self, request: &TailRequest) -> Result<EntryStream, TransportError>;
}
