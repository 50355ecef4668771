//! # Player Event Stream
//!
//! Every player surface (backend adapter or orchestrator) exposes the same
//! three events through a `tokio::sync::broadcast` channel:
//!
//! - **`Started`**: a subprocess was launched and playback is underway
//! - **`Stopped`**: the current playback session ended, naturally or by request
//! - **`Error`**: a runtime playback failure (spawn refusal, crash, or a
//!   backend-reported content problem)
//!
//! Subscribers receive events independently; a slow subscriber observes
//! [`RecvError::Lagged`] and can keep going, while [`RecvError::Closed`]
//! means the emitting player is gone.
//!
//! ## Subscribing
//!
//! A persistent observer loops on [`PlayerEventStream::recv`]:
//!
//! ```no_run
//! use player_traits::events::{PlayerEvent, PlayerEvents};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let events = PlayerEvents::default();
//! let mut stream = events.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = stream.recv().await {
//!         println!("{}", event.description());
//!     }
//! });
//! # }
//! ```
//!
//! A one-shot wait is a single `recv` on a fresh stream, dropped afterwards.
//!
//! ## Error events must be observed
//!
//! Runtime failures are only reported here; `play` does not return them. A
//! player whose `Error` event fires with no live subscriber logs the failure
//! through `tracing` so it is never silently lost, but callers that care
//! about failures are expected to hold a subscription.

use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::PlayerError;

pub use tokio::sync::broadcast::error::RecvError;

/// Default buffer size for a player event channel.
///
/// Playback emits events at human pace, so a small buffer is plenty;
/// subscribers that still fall behind receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 32;

/// Events emitted by every player surface, regardless of backend.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A subprocess was launched and playback is underway.
    Started,
    /// The playback session ended, naturally or by request.
    Stopped,
    /// A runtime playback failure.
    Error(Arc<PlayerError>),
}

impl PlayerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::Started => "Playback started",
            PlayerEvent::Stopped => "Playback stopped",
            PlayerEvent::Error(_) => "Playback error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlayerEvent::Error(_))
    }
}

/// Broadcast channel for player events.
///
/// Cloning shares the channel. Emission never blocks and never fails; events
/// sent while nobody is subscribed are dropped (error events are additionally
/// logged, see the module docs).
#[derive(Clone)]
pub struct PlayerEvents {
    sender: broadcast::Sender<PlayerEvent>,
}

impl PlayerEvents {
    /// Creates an event channel with the specified buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates an event channel with the default buffer size.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn emit(&self, event: PlayerEvent) -> usize {
        if self.sender.receiver_count() == 0 {
            if let PlayerEvent::Error(err) = &event {
                tracing::error!(error = %err, "player error event with no subscribers");
            }
            return 0;
        }
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new subscriber to receive future events.
    ///
    /// Each call creates an independent receiver; past events are not
    /// replayed.
    pub fn subscribe(&self) -> PlayerEventStream {
        PlayerEventStream::new(self.sender.subscribe())
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl fmt::Debug for PlayerEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerEvents")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&PlayerEvent) -> bool + Send + Sync>;

/// A receiver of player events with optional filtering.
///
/// # Example
///
/// ```
/// use player_traits::events::{PlayerEvent, PlayerEvents};
///
/// let events = PlayerEvents::default();
/// let errors_only = events.subscribe().filter(PlayerEvent::is_error);
/// ```
pub struct PlayerEventStream {
    receiver: broadcast::Receiver<PlayerEvent>,
    filter: Option<EventFilter>,
}

impl PlayerEventStream {
    /// Creates a stream from a raw broadcast receiver.
    pub fn new(receiver: broadcast::Receiver<PlayerEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter; only matching events are returned by `recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlayerEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, and `RecvError::Closed` once the emitting player is dropped.
    pub async fn recv(&mut self) -> Result<PlayerEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<PlayerEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for PlayerEventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerEventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_starts_empty() {
        let events = PlayerEvents::new(10);
        assert_eq!(events.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_subscription_count() {
        let events = PlayerEvents::new(10);
        let _sub1 = events.subscribe();
        let _sub2 = events.subscribe();
        assert_eq!(events.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_dropped() {
        let events = PlayerEvents::new(10);
        assert_eq!(events.emit(PlayerEvent::Started), 0);

        // Error events are logged, not panicked on.
        let err = Arc::new(PlayerError::NoPlayersAvailable);
        assert_eq!(events.emit(PlayerEvent::Error(err)), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let events = PlayerEvents::new(10);
        let mut sub = events.subscribe();

        assert_eq!(events.emit(PlayerEvent::Started), 1);
        assert_eq!(events.emit(PlayerEvent::Stopped), 1);

        assert!(matches!(sub.recv().await, Ok(PlayerEvent::Started)));
        assert!(matches!(sub.recv().await, Ok(PlayerEvent::Stopped)));
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let events = PlayerEvents::new(10);
        let mut sub1 = events.subscribe();
        let mut sub2 = events.subscribe();

        events.emit(PlayerEvent::Started);

        assert!(matches!(sub1.recv().await, Ok(PlayerEvent::Started)));
        assert!(matches!(sub2.recv().await, Ok(PlayerEvent::Started)));
    }

    #[tokio::test]
    async fn test_filter_skips_non_matching_events() {
        let events = PlayerEvents::new(10);
        let mut errors = events.subscribe().filter(PlayerEvent::is_error);

        events.emit(PlayerEvent::Started);
        events.emit(PlayerEvent::Error(Arc::new(PlayerError::NoPlayersAvailable)));

        let received = errors.recv().await.unwrap();
        assert!(received.is_error());
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let events = PlayerEvents::new(10);
        let mut sub = events.subscribe();
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let events = PlayerEvents::new(2);
        let mut sub = events.subscribe();

        for _ in 0..5 {
            events.emit(PlayerEvent::Started);
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_closed_after_sender_dropped() {
        let events = PlayerEvents::new(10);
        let mut sub = events.subscribe();
        drop(events);

        assert!(matches!(sub.recv().await, Err(RecvError::Closed)));
    }
}
