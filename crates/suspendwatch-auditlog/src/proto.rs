//! Wire messages for the Cloud Logging tail RPC.
//!
//! Only the fields the tailer reads are declared; prost skips the rest.

/// `google.logging.v2.TailLogEntriesRequest`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TailLogEntriesRequest {
    #[prost(string, repeated, tag = "1")]
    pub resource_names: Vec<String>,
    #[prost(string, tag = "2")]
    pub filter: String,
    #[prost(message, optional, tag = "3")]
    pub buffer_window: Option<prost_types::Duration>,
}

/// `google.logging.v2.TailLogEntriesResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TailLogEntriesResponse {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<LogEntry>,
}

/// `google.logging.v2.LogEntry`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LogEntry {
    #[prost(message, optional, tag = "2")]
    pub proto_payload: Option<prost_types::Any>,
    #[prost(string, tag = "4")]
    pub insert_id: String,
    #[prost(message, optional, tag = "9")]
    pub timestamp: Option<prost_types::Timestamp>,
    #[prost(string, tag = "12")]
    pub log_name: String,
}

/// `google.cloud.audit.AuditLog`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuditLog {
    #[prost(message, optional, tag = "2")]
    pub status: Option<Status>,
    #[prost(message, optional, tag = "3")]
    pub authentication_info: Option<AuthenticationInfo>,
    #[prost(string, tag = "7")]
    pub service_name: String,
    #[prost(string, tag = "8")]
    pub method_name: String,
    #[prost(string, tag = "11")]
    pub resource_name: String,
}

/// `google.cloud.audit.AuthenticationInfo`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthenticationInfo {
    #[prost(string, tag = "1")]
    pub principal_email: String,
}

/// `google.rpc.Status`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

pub const AUDIT_LOG_TYPE_URL: &str = "type.googleapis.com/google.cloud.audit.AuditLog";

pub const TAIL_LOG_ENTRIES_PATH: &str = "/google.logging.v2.LoggingServiceV2/TailLogEntries";
