//! The media service subsystem.
//!
//! The registry maps breakpoint names to native query handles and their
//! listeners. Listeners feed the match state, which owns the ordered set of
//! matching names. Membership changes are coalesced by a notification hub and
//! delivered on [`MediaService::flush`] to callbacks and [`MediaStream`]s.

/// Notification event types.
pub mod events;
/// Coalescing notification hub.
pub mod notify;
/// Breakpoint registry.
pub(crate) mod registry;
/// Service facade.
pub mod service;
/// Match set and derived state.
pub mod state;
/// Channel-backed subscriber stream.
pub mod stream;

pub use events::{MediaEvent, SubscriptionId};
pub use notify::ChangeCallback;
pub use service::{MediaService, Subscription};
pub use state::{Lifecycle, MatchSet};
pub use stream::MediaStream;
