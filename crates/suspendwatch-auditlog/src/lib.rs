//! Audit log tailing.
//!
//! Cloud Logging's `TailLogEntries` sessions end on their own after a while and
//! drop on transient failures. [`Tailer`] hides that: it reopens expired
//! sessions straight away, throttles reconnects after other failures with a
//! [`ReconnectLimiter`], and hands decoded [`AuditEntry`] values to a caller
//! supplied handler in arrival order.

pub mod filter;
mod grpc;
mod limiter;
pub mod proto;
mod tailer;
mod transport;

pub use filter::TailFilter;
pub use grpc::{BearerInterceptor, GrpcTailTransport, TokenSource, ACCESS_TOKEN_VAR, LOGGING_ENDPOINT};
pub use limiter::ReconnectLimiter;
pub use tailer::{classify, decode_entry, AuditEntry, Recovery, TailError, Tailer};
pub use transport::{EntryStream, TailRequest, TailTransport, TransportError};
