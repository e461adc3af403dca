//! Timing and cancellation behavior of code polling.

mod common;

use common::{assert_close, ScriptedApi};
use sms_order::{CancellationToken, CodePoller, OrderError, PollConfig, PollEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_stream::StreamExt;

const INTERVAL: Duration = Duration::from_secs(5);

fn poller(api: Arc<ScriptedApi>, max_attempts: u32) -> CodePoller {
    CodePoller::new(api, PollConfig::new(INTERVAL, max_attempts))
}

#[tokio::test(start_paused = true)]
async fn test_exactly_n_attempts_without_code() {
    let api = Arc::new(ScriptedApi::pending_forever());
    let start = Instant::now();

    let result = poller(api.clone(), 5)
        .wait_for_code("ord_1", &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(OrderError::Timeout { attempts: 5 })));
    assert_eq!(api.call_count(), 5);
    // No delay after the final attempt.
    assert_close(start.elapsed(), INTERVAL * 4);
}

#[tokio::test(start_paused = true)]
async fn test_stops_immediately_on_code() {
    let api = Arc::new(ScriptedApi::code_after(2, "908172"));
    let start = Instant::now();

    let code = poller(api.clone(), 10)
        .wait_for_code("ord_1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(code, "908172");
    assert_eq!(api.call_count(), 3);
    assert_close(start.elapsed(), INTERVAL * 2);
}

#[tokio::test(start_paused = true)]
async fn test_interval_between_polls_is_constant() {
    let api = Arc::new(ScriptedApi::pending_forever());
    let start = Instant::now();

    let _ = poller(api.clone(), 6)
        .wait_for_code("ord_1", &CancellationToken::new())
        .await;

    let calls = api.call_times();
    assert_eq!(calls.len(), 6);
    assert_close(calls[0] - start, Duration::ZERO);
    for pair in calls.windows(2) {
        assert_close(pair[1] - pair[0], INTERVAL);
    }
}

#[tokio::test(start_paused = true)]
async fn test_events_report_each_attempt() {
    let api = Arc::new(ScriptedApi::code_after(1, "5511"));

    let events: Vec<_> = poller(api, 4)
        .events("ord_1", CancellationToken::new())
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        Ok(PollEvent::Waiting {
            attempt: 1,
            max_attempts: 4
        })
    ));
    assert!(matches!(
        &events[1],
        Ok(PollEvent::CodeReceived { code, attempt: 2 }) if code == "5511"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_further_requests() {
    let api = Arc::new(ScriptedApi::pending_forever());
    let cancel = CancellationToken::new();

    let handle = poller(api.clone(), 100).spawn("ord_1", &cancel);

    // Requests at t=0s, 5s and 10s.
    sleep(Duration::from_secs(12)).await;
    cancel.cancel();

    let result = handle.join().await;
    assert!(matches!(result, Err(OrderError::Cancelled)));

    let seen = api.call_count();
    assert_eq!(seen, 3);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.call_count(), seen);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_stops_polling() {
    let api = Arc::new(ScriptedApi::pending_forever());
    let parent = CancellationToken::new();

    let handle = poller(api.clone(), 100).spawn("ord_1", &parent);

    sleep(Duration::from_secs(7)).await;
    assert!(!handle.is_finished());
    drop(handle);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.call_count(), 2);
    assert!(!parent.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_stream_stops_polling() {
    let api = Arc::new(ScriptedApi::pending_forever());

    {
        let stream = poller(api.clone(), 100).events("ord_1", CancellationToken::new());
        tokio::pin!(stream);
        let first = stream.next().await;
        assert!(matches!(first, Some(Ok(PollEvent::Waiting { attempt: 1, .. }))));
    }

    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.call_count(), 1);
}
