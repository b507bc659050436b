use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{DeliveryError, MediaResult};

use super::events::{MediaEvent, SubscriptionId};

/// A channel-backed subscription to "mediaChanged" notifications.
///
/// The stream may be moved to another thread. Dropping it unsubscribes: the
/// service prunes the disconnected sender on its next delivery. Teardown of
/// the service disconnects every stream.
#[derive(Debug)]
pub struct MediaStream {
    subscription_id: SubscriptionId,
    rx: Receiver<MediaEvent>,
}

impl MediaStream {
    pub(crate) fn new(subscription_id: SubscriptionId, rx: Receiver<MediaEvent>) -> Self {
        Self { subscription_id, rx }
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> MediaResult<MediaEvent> {
        self.rx.recv().map_err(|_| DeliveryError::Disconnected.into())
    }

    /// Receive the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> MediaResult<MediaEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| {
            let err = match err {
                RecvTimeoutError::Timeout => DeliveryError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                RecvTimeoutError::Disconnected => DeliveryError::Disconnected,
            };
            err.into()
        })
    }

    /// Receive an already-delivered event without blocking.
    pub fn try_recv(&self) -> MediaResult<MediaEvent> {
        self.rx.try_recv().map_err(|err| {
            let err = match err {
                TryRecvError::Empty => DeliveryError::Empty,
                TryRecvError::Disconnected => DeliveryError::Disconnected,
            };
            err.into()
        })
    }

    /// Drains every already-delivered event.
    #[must_use]
    pub fn drain(&self) -> Vec<MediaEvent> {
        self.rx.try_iter().collect()
    }

    /// Number of events waiting in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no event is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Explicit unsubscription; equivalent to dropping the stream.
    pub fn unsubscribe(self) {}
}
