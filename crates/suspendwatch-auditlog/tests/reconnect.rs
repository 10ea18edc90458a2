//! Session recovery behaviour against a scripted transport.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use suspendwatch_auditlog::{TailError, TailFilter, Tailer, TransportError};
use suspendwatch_test_utils::{audit_log_entry, ScriptedTransport};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const PATH: &str = "helm.toolkit.fluxcd.io/v2/namespaces/prod/helmreleases/app";

fn status(code: tonic::Code, message: &str) -> TransportError {
    TransportError::Status(tonic::Status::new(code, message))
}

/// Tail until `expected` entries were handled, returning their insert ids.
async fn collect(tailer: &Tailer, expected: usize) -> Result<Vec<String>, TailError> {
    let cancel = CancellationToken::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    tailer
        .tail(&cancel, |entry| {
            let mut ids = seen.lock();
            ids.push(entry.insert_id);
            if ids.len() == expected {
                cancel.cancel();
            }
            async { Ok::<(), std::io::Error>(()) }
        })
        .await?;

    let ids = seen.lock().clone();
    Ok(ids)
}

#[tokio::test(start_paused = true)]
async fn expired_session_reopens_with_identical_request_and_keeps_entries() {
    let transport = Arc::new(ScriptedTransport::new([
        vec![
            Ok(vec![
                audit_log_entry("1", PATH, "alice@example.com", 0),
                audit_log_entry("2", PATH, "alice@example.com", 0),
            ]),
            Ok(vec![audit_log_entry("3", PATH, "alice@example.com", 0)]),
            Err(status(tonic::Code::OutOfRange, "Exceeded maximum allowed stream duration")),
        ],
        vec![Ok(vec![audit_log_entry("4", PATH, "bob@example.com", 0)])],
    ]));
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"));

    let ids = collect(&tailer, 4).await.unwrap();

    assert_eq!(ids, vec!["1", "2", "3", "4"]);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(requests[0], TailFilter::new("acme", "prod").request());
}

#[tokio::test(start_paused = true)]
async fn expiry_after_a_long_session_reopens_immediately() {
    let transport = Arc::new(ScriptedTransport::new([
        vec![
            Ok(vec![audit_log_entry("1", PATH, "alice@example.com", 0)]),
            Err(status(tonic::Code::OutOfRange, "Exceeded maximum allowed stream duration")),
        ],
        vec![Ok(vec![audit_log_entry("2", PATH, "alice@example.com", 0)])],
    ]));
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"))
        .with_reconnect_limit(1, Duration::from_secs(15));
    let cancel = CancellationToken::new();

    let start = Instant::now();
    tailer
        .tail(&cancel, |entry| {
            let first = entry.insert_id == "1";
            if !first {
                cancel.cancel();
            }
            async move {
                if first {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                Ok::<(), std::io::Error>(())
            }
        })
        .await
        .unwrap();

    // The session itself outlasted the refill interval, so no extra wait.
    assert_eq!(transport.opens(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn repeated_instant_expiries_are_throttled() {
    let expired = || vec![Err(status(tonic::Code::OutOfRange, "Exceeded maximum allowed stream duration"))];
    let transport = Arc::new(ScriptedTransport::new([
        expired(),
        expired(),
        expired(),
        expired(),
        expired(),
        vec![Ok(vec![audit_log_entry("1", PATH, "alice@example.com", 0)])],
    ]));
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"))
        .with_reconnect_limit(3, Duration::from_secs(15));

    let start = Instant::now();
    collect(&tailer, 1).await.unwrap();

    // Three opens ride the burst, the remaining three wait a token each.
    assert_eq!(transport.opens(), 6);
    assert!(start.elapsed() >= Duration::from_secs(45));
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn deadline_exceeded_is_throttled_like_other_failures() {
    let transport = Arc::new(ScriptedTransport::new([
        vec![Err(status(tonic::Code::DeadlineExceeded, ""))],
        vec![Err(status(tonic::Code::DeadlineExceeded, ""))],
        vec![Ok(vec![audit_log_entry("1", PATH, "alice@example.com", 0)])],
    ]));
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"))
        .with_reconnect_limit(1, Duration::from_secs(15));

    let start = Instant::now();
    collect(&tailer, 1).await.unwrap();

    assert_eq!(transport.opens(), 3);
    assert!(start.elapsed() >= Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn other_failures_are_throttled() {
    let transport = Arc::new(ScriptedTransport::new([
        vec![Err(status(tonic::Code::Unavailable, "connection reset"))],
        vec![],
        vec![Err(status(tonic::Code::Internal, "stream broken"))],
        vec![Ok(vec![audit_log_entry("1", PATH, "alice@example.com", 0)])],
    ]));
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"))
        .with_reconnect_limit(2, Duration::from_secs(15));

    let start = Instant::now();
    collect(&tailer, 1).await.unwrap();

    // Two opens ride the burst, the other two wait a token each.
    assert_eq!(transport.opens(), 4);
    assert!(start.elapsed() >= Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_an_idle_session() {
    let transport = Arc::new(ScriptedTransport::default());
    let tailer = Tailer::new(transport.clone(), TailFilter::new("acme", "prod"));
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            cancel.cancel();
        })
    };

    tailer
        .tail(&cancel, |_| async { Ok::<(), std::io::Error>(()) })
        .await
        .unwrap();
    canceller.await.unwrap();

    assert_eq!(transport.opens(), 1);
}
