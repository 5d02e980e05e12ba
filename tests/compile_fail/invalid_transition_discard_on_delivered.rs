// ABOUTME: Compile-fail test verifying a delivered session cannot be discarded.
// ABOUTME: This test should fail to compile, validating state machine safety.

use dngcm::delivery::{DeliverySession, Delivered};
use dngcm::transport::Transport;

async fn try_discard_delivered<T: Transport>(session: DeliverySession<Delivered>, transport: &T) {
    // ERROR: Delivered does not implement Discardable
    let _ = session.discard(transport).await;
}

fn main() {}
