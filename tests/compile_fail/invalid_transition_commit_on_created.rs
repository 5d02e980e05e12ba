// ABOUTME: Compile-fail test verifying commit cannot be called before the session is read.
// ABOUTME: This test should fail to compile, validating state machine safety.

use dngcm::delivery::{Created, DeliverySession};
use dngcm::transport::Transport;

async fn try_commit_unread<T: Transport>(session: DeliverySession<Created>, transport: &T) {
    // ERROR: commit() method doesn't exist on DeliverySession<Created>
    let _ = session.commit(transport).await;
}

fn main() {}
