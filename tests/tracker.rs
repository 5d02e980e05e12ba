// ABOUTME: Tests for request tracker polling and verdict policies.
// ABOUTME: Uses a scripted transport; no server needed.

mod support;

use dngcm::oslc::vocab::auto;
use dngcm::tracker::{
    PollPolicy, RequestTracker, TrackerError, Verdict, VerdictPolicy, WaitOptions, track,
};
use dngcm::transport::Method;
use dngcm::types::TrackerUri;
use std::time::Duration;
use support::fixtures::*;
use support::scripted::ScriptedTransport;
use tokio_util::sync::CancellationToken;

const TRACKER: &str = "https://clm.example.com/rm/tracker/1";

fn scripted(states: &[fn(&str) -> dngcm::transport::Response]) -> ScriptedTransport {
    let server = ScriptedTransport::default();
    for state in states {
        server.on(Method::Get, TRACKER, state(TRACKER));
    }
    server
}

// =============================================================================
// Polling
// =============================================================================

#[tokio::test]
async fn completes_after_exactly_three_reads() {
    support::init_tracing();
    let server = scripted(&[tracker_in_progress, tracker_in_progress, tracker_passed]);

    let mut tracker = RequestTracker::new(&server, TrackerUri::new(TRACKER));
    let verdict = tracker.await_completion(&wait()).await.unwrap();

    assert_eq!(verdict, Verdict::Passed);
    assert_eq!(tracker.reads(), 3);
    assert_eq!(server.sent(Method::Get, TRACKER), 3);
}

#[tokio::test]
async fn never_completing_tracker_times_out() {
    let server = scripted(&[tracker_in_progress]);
    let wait = WaitOptions::new(
        PollPolicy {
            timeout: Duration::from_millis(30),
            ..fast_poll()
        },
        CancellationToken::new(),
    );

    let err = RequestTracker::new(&server, TrackerUri::new(TRACKER))
        .await_completion(&wait)
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Timeout { .. }), "got {err:?}");
    assert!(server.sent(Method::Get, TRACKER) >= 2);
}

#[tokio::test]
async fn cancelled_token_stops_before_reading() {
    let server = scripted(&[tracker_in_progress]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = RequestTracker::new(&server, TrackerUri::new(TRACKER))
        .await_completion(&WaitOptions::new(fast_poll(), cancel))
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Cancelled { .. }));
    assert_eq!(server.sent(Method::Get, TRACKER), 0);
}

#[tokio::test]
async fn cancellation_interrupts_the_wait_between_reads() {
    let server = scripted(&[tracker_in_progress]);
    let cancel = CancellationToken::new();
    let wait = WaitOptions::new(
        PollPolicy {
            interval: Duration::from_secs(30),
            max_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
            ..fast_poll()
        },
        cancel.clone(),
    );

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });
    let err = tokio::time::timeout(
        Duration::from_secs(5),
        RequestTracker::new(&server, TrackerUri::new(TRACKER)).await_completion(&wait),
    )
    .await
    .expect("cancellation should end the wait")
    .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, TrackerError::Cancelled { .. }));
    assert_eq!(server.sent(Method::Get, TRACKER), 1);
}

#[tokio::test]
async fn non_200_read_is_an_error() {
    let server = ScriptedTransport::default();
    server.on(Method::Get, TRACKER, status(500));

    let err = RequestTracker::new(&server, TrackerUri::new(TRACKER))
        .await_completion(&wait())
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn body_without_state_is_a_protocol_error() {
    let server = ScriptedTransport::default();
    let mut graph = dngcm::oslc::Graph::new();
    graph.insert(
        TRACKER,
        dngcm::oslc::vocab::prop::DC_TITLE,
        dngcm::oslc::Term::literal("no state here"),
    );
    server.on(Method::Get, TRACKER, rdf_json(&graph));

    let err = RequestTracker::new(&server, TrackerUri::new(TRACKER))
        .state()
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Protocol { .. }), "got {err:?}");
}

// =============================================================================
// Verdicts
// =============================================================================

#[tokio::test]
async fn reference_of_completed_tracker_is_returned() {
    let server = ScriptedTransport::default();
    server.on(
        Method::Get,
        TRACKER,
        tracker_complete(TRACKER, auto::PASSED, Some(CHANGESET)),
    );

    let completion = track(&server, TrackerUri::new(TRACKER), &wait(), VerdictPolicy::Strict)
        .await
        .unwrap();

    assert_eq!(completion.reference.as_deref(), Some(CHANGESET));
    assert!(completion.message.contains("Tracked operation"));
}

#[tokio::test]
async fn unrecognized_verdict_is_rejected_under_strict_policy() {
    let server = ScriptedTransport::default();
    server.on(
        Method::Get,
        TRACKER,
        tracker_complete(TRACKER, "http://example.com/ns#maybe", None),
    );

    let err = track(&server, TrackerUri::new(TRACKER), &wait(), VerdictPolicy::Strict)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Rejected {
            verdict: Verdict::Unrecognized(_),
            ..
        }
    ));
}

#[tokio::test]
async fn failed_verdict_passes_only_under_reject_errors() {
    for (policy, accepted) in [
        (VerdictPolicy::Strict, false),
        (VerdictPolicy::RejectFailures, false),
        (VerdictPolicy::RejectErrors, true),
    ] {
        let server = ScriptedTransport::default();
        server.on(
            Method::Get,
            TRACKER,
            tracker_complete(TRACKER, auto::FAILED, None),
        );
        let result = track(&server, TrackerUri::new(TRACKER), &wait(), policy).await;
        assert_eq!(result.is_ok(), accepted, "{policy:?}");
    }
}
