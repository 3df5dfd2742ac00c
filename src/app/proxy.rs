//! Defines an abstraction over the event sending mechanism.

use super::events::UserEvent;
use tokio::sync::mpsc::UnboundedSender;

/// A trait that abstracts the sending of user events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

/// A channel whose receiver is drained by the front-end's event loop.
impl EventProxy for UnboundedSender<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // A dropped receiver means the front-end is shutting down.
        if let Err(e) = self.send(event) {
            tracing::warn!("Failed to send event to front-end: {:?}", e.0);
        }
    }
}
