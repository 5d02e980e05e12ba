// ABOUTME: Delivery sessions using the type state pattern.
// ABOUTME: Exports state markers, the session struct, transitions and the delivery driver.

mod error;
mod perform;
mod session;
mod state;
mod transitions;

pub use error::{DeliveryError, DeliveryErrorKind};
pub use perform::{DeliveryOutcome, perform_delivery};
pub use session::{DeliveryRequest, DeliverySession};
pub use state::{Committing, Created, Delivered, Discardable, Ready, SessionState};
pub use transitions::{CommitOutcome, ReadOutcome, TransitionResult};
