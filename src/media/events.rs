//! Change notification types.
//!
//! The payload deliberately carries no match data: subscribers re-read the
//! service state when notified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The "mediaChanged" notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaEvent {
    /// Unique id of this delivery.
    pub event_id: Uuid,
    /// Monotonic per-service delivery counter, starting at 1.
    pub sequence: u64,
    /// When the notification was flushed.
    pub timestamp: DateTime<Utc>,
}

impl MediaEvent {
    /// Event name used by hosts that route notifications by name.
    pub const NAME: &'static str = "mediaChanged";

    #[must_use]
    pub(crate) fn new(sequence: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
        }
    }
}
