//! The reconnecting tail loop.

use crate::filter::TailFilter;
use crate::limiter::ReconnectLimiter;
use crate::proto::{AuditLog, LogEntry, AUDIT_LOG_TYPE_URL};
use crate::transport::{TailRequest, TailTransport, TransportError};
use futures_util::StreamExt;
use prost::Message;
use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tonic::Code;
use tracing::{debug, info, warn};

/// Tailing errors. Anything surfacing here ends the tail.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("log tailing failed: {0}")]
    Transport(#[source] TransportError),

    #[error("entry handler failed: {0}")]
    Handler(#[source] Box<dyn StdError + Send + Sync>),
}

/// A decoded audit record handed to the entry handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub insert_id: String,
    pub method_name: String,
    /// `<group>/<version>/namespaces/<namespace>/<kind>/<name>`.
    pub resource_name: String,
    pub principal_email: String,
    /// `google.rpc.Code` of the operation; zero means it succeeded.
    pub status_code: i32,
    pub status_message: String,
}

impl From<AuditLog> for AuditEntry {
    fn from(log: AuditLog) -> Self {
        let (status_code, status_message) = log
            .status
            .map(|s| (s.code, s.message))
            .unwrap_or_default();
        Self {
            insert_id: String::new(),
            method_name: log.method_name,
            resource_name: log.resource_name,
            principal_email: log
                .authentication_info
                .map(|a| a.principal_email)
                .unwrap_or_default(),
            status_code,
            status_message,
        }
    }
}

/// How a failed session is followed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The server ended a session that hit its lifetime cap.
    SessionExpired,
    /// Any other streaming failure.
    Throttled,
    /// Give up.
    Fatal,
}

/// Decide how to recover from a session failure. Both retryable outcomes
/// reopen through the reconnect limiter; a session that ran for a while has
/// refilled the bucket, so an expiry reopens without waiting.
pub fn classify(error: &TransportError) -> Recovery {
    match error {
        TransportError::Status(status) => {
            let expired = status.code() == Code::OutOfRange
                || status.message().to_lowercase().contains("exceeded maximum");
            if expired {
                Recovery::SessionExpired
            } else {
                Recovery::Throttled
            }
        }
        TransportError::Setup(_) | TransportError::Auth(_) => Recovery::Fatal,
    }
}

/// Decode a log entry's audit payload, logging and dropping anything else.
pub fn decode_entry(entry: &LogEntry) -> Option<AuditEntry> {
    let Some(payload) = entry.proto_payload.as_ref() else {
        warn!(insert_id = %entry.insert_id, "log entry has no proto payload");
        return None;
    };

    if payload.type_url != AUDIT_LOG_TYPE_URL {
        warn!(insert_id = %entry.insert_id, type_url = %payload.type_url, "unexpected payload type");
        return None;
    }

    match AuditLog::decode(payload.value.as_slice()) {
        Ok(log) => Some(AuditEntry {
            insert_id: entry.insert_id.clone(),
            ..AuditEntry::from(log)
        }),
        Err(error) => {
            warn!(insert_id = %entry.insert_id, %error, "failed to decode audit payload");
            None
        }
    }
}

enum SessionEnd {
    Cancelled,
    Closed,
    Failed(TransportError),
}

/// Turns session-bounded tail streams into one uninterrupted sequence of
/// audit entries.
pub struct Tailer {
    transport: Arc<dyn TailTransport>,
    filter: TailFilter,
    reconnect_burst: u32,
    reconnect_interval: Duration,
}

impl Tailer {
    pub fn new(transport: Arc<dyn TailTransport>, filter: TailFilter) -> Self {
        Self {
            transport,
            filter,
            reconnect_burst: 3,
            reconnect_interval: Duration::from_secs(15),
        }
    }

    /// Reconnect throttling: `burst` immediate reopens, then one per `interval`.
    pub fn with_reconnect_limit(mut self, burst: u32, interval: Duration) -> Self {
        self.reconnect_burst = burst;
        self.reconnect_interval = interval;
        self
    }

    pub fn filter(&self) -> &TailFilter {
        &self.filter
    }

    /// Tail until cancelled, feeding every decoded entry to `handler` in
    /// arrival order. A handler error ends the tail.
    pub async fn tail<F, Fut, E>(
        &self,
        cancel: &CancellationToken,
        mut handler: F,
    ) -> Result<(), TailError>
    where
        F: FnMut(AuditEntry) -> Fut + Send,
        Fut: Future<Output = Result<(), E>> + Send,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let request = self.filter.request();
        let mut limiter = ReconnectLimiter::new(self.reconnect_burst, self.reconnect_interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                _ = limiter.acquire() => {}
            }

            match self.session(&request, cancel, &mut handler).await? {
                SessionEnd::Cancelled => {
                    info!("log tailing cancelled");
                    return Ok(());
                }
                SessionEnd::Closed => {
                    warn!("tail stream closed by server (will retry)");
                }
                SessionEnd::Failed(error) => match classify(&error) {
                    Recovery::SessionExpired => {
                        warn!(%error, "tail session expired, reopening");
                    }
                    Recovery::Throttled => {
                        warn!(%error, "tail stream error (will retry)");
                    }
                    Recovery::Fatal => return Err(TailError::Transport(error)),
                },
            }
        }
    }

    async fn session<F, Fut, E>(
        &self,
        request: &TailRequest,
        cancel: &CancellationToken,
        handler: &mut F,
    ) -> Result<SessionEnd, TailError>
    where
        F: FnMut(AuditEntry) -> Fut + Send,
        Fut: Future<Output = Result<(), E>> + Send,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
            opened = self.transport.open(request) => match opened {
                Ok(stream) => stream,
                Err(error) => return Ok(SessionEnd::Failed(error)),
            },
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
                next = stream.next() => next,
            };

            let batch = match next {
                None => return Ok(SessionEnd::Closed),
                Some(Err(error)) => return Ok(SessionEnd::Failed(error)),
                Some(Ok(batch)) => batch,
            };

            debug!(entries = batch.len(), "received log entries");
            for entry in batch.iter().filter_map(decode_entry) {
                handler(entry)
                    .await
                    .map_err(|e| TailError::Handler(e.into()))?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{AuthenticationInfo, Status};
    use crate::transport::EntryStream;
    use async_trait::async_trait;
    use futures_util::stream;
    use std::sync::Mutex;
    use test_case::test_case;

    fn audit_entry(insert_id: &str, resource: &str) -> LogEntry {
        let log = AuditLog {
            status: None,
            authentication_info: Some(AuthenticationInfo {
                principal_email: "alice@example.com".to_string(),
            }),
            service_name: "k8s.io".to_string(),
            method_name: "io.fluxcd.toolkit.helm.v2.helmreleases.patch".to_string(),
            resource_name: resource.to_string(),
        };
        LogEntry {
            proto_payload: Some(prost_types::Any {
                type_url: AUDIT_LOG_TYPE_URL.to_string(),
                value: log.encode_to_vec(),
            }),
            insert_id: insert_id.to_string(),
            timestamp: None,
            log_name: String::new(),
        }
    }

    #[test_case(Code::OutOfRange, "" => Recovery::SessionExpired ; "out of range")]
    #[test_case(Code::DeadlineExceeded, "" => Recovery::Throttled ; "deadline exceeded")]
    #[test_case(Code::Unknown, "Exceeded maximum allowed stream duration" => Recovery::SessionExpired ; "duration message")]
    #[test_case(Code::Unavailable, "connection reset" => Recovery::Throttled ; "unavailable")]
    #[test_case(Code::Internal, "" => Recovery::Throttled ; "internal")]
    #[test_case(Code::PermissionDenied, "" => Recovery::Throttled ; "permission denied")]
    fn test_classify_status(code: Code, message: &str) -> Recovery {
        classify(&TransportError::Status(tonic::Status::new(code, message)))
    }

    #[test]
    fn test_classify_setup_is_fatal() {
        assert_eq!(classify(&TransportError::Setup("bad uri".into())), Recovery::Fatal);
        assert_eq!(classify(&TransportError::Auth("no token".into())), Recovery::Fatal);
    }

    #[test]
    fn test_decode_entry() {
        let decoded = decode_entry(&audit_entry("abc", "g/v/namespaces/ns/k/n")).unwrap();
        assert_eq!(decoded.insert_id, "abc");
        assert_eq!(decoded.resource_name, "g/v/namespaces/ns/k/n");
        assert_eq!(decoded.principal_email, "alice@example.com");
        assert_eq!(decoded.status_code, 0);
    }

    #[test]
    fn test_decode_entry_with_failed_status() {
        let log = AuditLog {
            status: Some(Status {
                code: 7,
                message: "forbidden".to_string(),
            }),
            ..Default::default()
        };
        let entry = LogEntry {
            proto_payload: Some(prost_types::Any {
                type_url: AUDIT_LOG_TYPE_URL.to_string(),
                value: log.encode_to_vec(),
            }),
            ..Default::default()
        };
        let decoded = decode_entry(&entry).unwrap();
        assert_eq!(decoded.status_code, 7);
        assert_eq!(decoded.status_message, "forbidden");
    }

    #[test]
    fn test_decode_skips_unusable_payloads() {
        assert!(decode_entry(&LogEntry::default()).is_none());

        let mut wrong_type = audit_entry("a", "x");
        if let Some(any) = wrong_type.proto_payload.as_mut() {
            any.type_url = "type.googleapis.com/google.protobuf.Empty".to_string();
        }
        assert!(decode_entry(&wrong_type).is_none());

        let mut garbage = audit_entry("b", "x");
        if let Some(any) = garbage.proto_payload.as_mut() {
            any.value = vec![0xff, 0xff, 0xff];
        }
        assert!(decode_entry(&garbage).is_none());
    }

    /// Serves one scripted session per `open`, failing setup once exhausted.
    struct Sessions(Mutex<Vec<Vec<Result<Vec<LogEntry>, TransportError>>>>);

    #[async_trait]
    impl TailTransport for Sessions {
        async fn open(&self, _request: &TailRequest) -> Result<EntryStream, TransportError> {
            let mut sessions = self.0.lock().unwrap();
            if sessions.is_empty() {
                return Err(TransportError::Setup("no more sessions".into()));
            }
            Ok(stream::iter(sessions.remove(0)).boxed())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_error_is_fatal() {
        let transport = Arc::new(Sessions(Mutex::new(vec![vec![Ok(vec![
            audit_entry("1", "a"),
            audit_entry("2", "b"),
        ])]])));
        let tailer = Tailer::new(transport, TailFilter::new("p", "c"));

        let mut seen = Vec::new();
        let result = tailer
            .tail(&CancellationToken::new(), |entry| {
                seen.push(entry.insert_id);
                async { Err::<(), _>("boom") }
            })
            .await;

        assert!(matches!(result, Err(TailError::Handler(_))));
        assert_eq!(seen, vec!["1".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_setup_failure_is_fatal() {
        let tailer = Tailer::new(Arc::new(Sessions(Mutex::new(vec![]))), TailFilter::new("p", "c"));
        let result = tailer
            .tail(&CancellationToken::new(), |_| async { Ok::<(), std::io::Error>(()) })
            .await;
        assert!(matches!(
            result,
            Err(TailError::Transport(TransportError::Setup(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let tailer = Tailer::new(Arc::new(Sessions(Mutex::new(vec![]))), TailFilter::new("p", "c"));

        tailer
            .tail(&cancel, |_| async { Ok::<(), std::io::Error>(()) })
            .await
            .unwrap();
    }
}
