use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use parking_lot::Mutex;
use prost::Message;
use std::collections::VecDeque;
use suspendwatch_auditlog::proto::{AuditLog, AuthenticationInfo, LogEntry, Status, AUDIT_LOG_TYPE_URL};
use suspendwatch_auditlog::{EntryStream, TailRequest, TailTransport, TransportError};

/// Items one scripted session yields before it ends.
pub type Session = Vec<Result<Vec<LogEntry>, TransportError>>;

/// Plays back scripted sessions, one per `open`. Once the script runs out,
/// sessions stay open without yielding anything.
#[derive(Default)]
pub struct ScriptedTransport {
    sessions: Mutex<VecDeque<Session>>,
    requests: Mutex<Vec<TailRequest>>,
}

impl ScriptedTransport {
    pub fn new(sessions: impl IntoIterator<Item = Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request a session was opened with, in order.
    pub fn requests(&self) -> Vec<TailRequest> {
        self.requests.lock().clone()
    }

    pub fn opens(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl TailTransport for ScriptedTransport {
    async fn open(&self, request: &TailRequest) -> Result<EntryStream, TransportError> {
        self.requests.lock().push(request.clone());
        match self.sessions.lock().pop_front() {
            Some(session) => Ok(stream::iter(session).boxed()),
            None => Ok(stream::pending().boxed()),
        }
    }
}

/// A log entry carrying an encoded audit record.
pub fn audit_log_entry(
    insert_id: &str,
    resource_name: &str,
    principal_email: &str,
    status_code: i32,
) -> LogEntry {
    let audit = AuditLog {
        status: (status_code != 0).then(|| Status {
            code: status_code,
            message: "operation failed".to_string(),
        }),
        authentication_info: Some(AuthenticationInfo {
            principal_email: principal_email.to_string(),
        }),
        service_name: "k8s.io".to_string(),
        method_name: "io.fluxcd.toolkit.v1.patch".to_string(),
        resource_name: resource_name.to_string(),
    };

    LogEntry {
        proto_payload: Some(prost_types::Any {
            type_url: AUDIT_LOG_TYPE_URL.to_string(),
            value: audit.encode_to_vec(),
        }),
        insert_id: insert_id.to_string(),
        timestamp: None,
        log_name: String::new(),
    }
}
