//! Host environment abstraction.
//!
//! The service never evaluates query syntax itself. It asks a
//! [`MediaEvaluator`] for a [`QueryHandle`] per query and reacts to the
//! handle's boolean state and change notifications.

use std::fmt;
use std::rc::Rc;

/// Scripted evaluator for tests and headless hosts.
pub mod scripted;

pub use scripted::ScriptedEnvironment;

/// Callback wired onto a query handle. Receives the handle's new match state.
pub type ChangeListener = Rc<dyn Fn(bool)>;

/// Subscription mechanism a handle accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionStyle {
    /// `addEventListener('change', ..)`-style subscription.
    Modern,
    /// `addListener(..)`-style subscription.
    Legacy,
    /// Neither is supported; the breakpoint keeps its initial state forever.
    Unsupported,
}

impl fmt::Display for SubscriptionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
            Self::Unsupported => "unsupported",
        };
        f.write_str(s)
    }
}

/// A live, environment-owned handle tracking one query.
pub trait QueryHandle {
    /// Current match state.
    fn matches(&self) -> bool;

    /// Modern change subscription. Returns `false` if the handle lacks it.
    fn add_change_listener(&self, _listener: ChangeListener) -> bool {
        false
    }

    /// Legacy change subscription. Returns `false` if the handle lacks it.
    fn add_legacy_listener(&self, _listener: ChangeListener) -> bool {
        false
    }
}

/// The host's native query evaluator.
pub trait MediaEvaluator {
    /// Produces a handle bound to `query`.
    fn evaluate(&self, query: &str) -> Rc<dyn QueryHandle>;
}

/// Wires `listener` onto `handle`, preferring the modern mechanism.
pub fn subscribe(handle: &dyn QueryHandle, listener: &ChangeListener) -> SubscriptionStyle {
    if handle.add_change_listener(Rc::clone(listener)) {
        SubscriptionStyle::Modern
    } else if handle.add_legacy_listener(Rc::clone(listener)) {
        SubscriptionStyle::Legacy
    } else {
        SubscriptionStyle::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct Fixed(bool);

    impl QueryHandle for Fixed {
        fn matches(&self) -> bool {
            self.0
        }
    }

    struct LegacyOnly(Cell<usize>);

    impl QueryHandle for LegacyOnly {
        fn matches(&self) -> bool {
            false
        }

        fn add_legacy_listener(&self, _listener: ChangeListener) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }
    }

    #[test]
    fn subscribe_reports_unsupported_for_bare_handles() {
        let listener: ChangeListener = Rc::new(|_| {});
        assert_eq!(subscribe(&Fixed(true), &listener), SubscriptionStyle::Unsupported);
    }

    #[test]
    fn subscribe_falls_back_to_legacy() {
        let handle = LegacyOnly(Cell::new(0));
        let listener: ChangeListener = Rc::new(|_| {});
        assert_eq!(subscribe(&handle, &listener), SubscriptionStyle::Legacy);
        assert_eq!(handle.0.get(), 1);
    }

    #[test]
    fn style_display() {
        assert_eq!(SubscriptionStyle::Modern.to_string(), "modern");
        assert_eq!(SubscriptionStyle::Unsupported.to_string(), "unsupported");
    }
}
