//! A deterministic [`MediaEvaluator`] driven by the caller.
//!
//! Queries start out not matching. `set_matches` flips every handle bound to
//! a query and fires their listeners, standing in for a viewport resize.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::{ChangeListener, MediaEvaluator, QueryHandle, SubscriptionStyle};

struct ScriptedHandle {
    matches: Cell<bool>,
    style: SubscriptionStyle,
    listeners: RefCell<Vec<ChangeListener>>,
}

impl ScriptedHandle {
    fn set(&self, matches: bool) {
        if self.matches.replace(matches) == matches {
            return;
        }
        // Snapshot so listeners may subscribe more handles while running.
        let listeners: Vec<ChangeListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(matches);
        }
    }

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl QueryHandle for ScriptedHandle {
    fn matches(&self) -> bool {
        self.matches.get()
    }

    fn add_change_listener(&self, listener: ChangeListener) -> bool {
        if self.style != SubscriptionStyle::Modern {
            return false;
        }
        self.listeners.borrow_mut().push(listener);
        true
    }

    fn add_legacy_listener(&self, listener: ChangeListener) -> bool {
        if self.style != SubscriptionStyle::Legacy {
            return false;
        }
        self.listeners.borrow_mut().push(listener);
        true
    }
}

/// Caller-driven evaluator.
pub struct ScriptedEnvironment {
    style: Cell<SubscriptionStyle>,
    states: RefCell<HashMap<String, bool>>,
    handles: RefCell<Vec<(String, Weak<ScriptedHandle>)>>,
    evaluations: Cell<usize>,
}

impl ScriptedEnvironment {
    /// Handles support the modern subscription mechanism.
    #[must_use]
    pub fn new() -> Self {
        Self::with_style(SubscriptionStyle::Modern)
    }

    /// Handles support only `style`.
    #[must_use]
    pub fn with_style(style: SubscriptionStyle) -> Self {
        Self {
            style: Cell::new(style),
            states: RefCell::new(HashMap::new()),
            handles: RefCell::new(Vec::new()),
            evaluations: Cell::new(0),
        }
    }

    /// Changes the style used for handles created from now on.
    pub fn set_style(&self, style: SubscriptionStyle) {
        self.style.set(style);
    }

    /// Sets the state of `query` and notifies every live handle bound to it.
    pub fn set_matches(&self, query: &str, matches: bool) {
        self.states.borrow_mut().insert(query.to_string(), matches);

        let live: Vec<Rc<ScriptedHandle>> = {
            let mut handles = self.handles.borrow_mut();
            handles.retain(|(_, h)| h.strong_count() > 0);
            handles
                .iter()
                .filter(|(q, _)| q == query)
                .filter_map(|(_, h)| h.upgrade())
                .collect()
        };
        for handle in live {
            handle.set(matches);
        }
    }

    /// Last state set for `query`.
    #[must_use]
    pub fn state(&self, query: &str) -> bool {
        self.states.borrow().get(query).copied().unwrap_or(false)
    }

    /// Number of `evaluate` calls so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Listeners attached across live handles for `query`.
    #[must_use]
    pub fn listener_count(&self, query: &str) -> usize {
        self.handles
            .borrow()
            .iter()
            .filter(|(q, _)| q == query)
            .filter_map(|(_, h)| h.upgrade())
            .map(|h| h.listener_count())
            .sum()
    }
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEvaluator for ScriptedEnvironment {
    fn evaluate(&self, query: &str) -> Rc<dyn QueryHandle> {
        self.evaluations.set(self.evaluations.get() + 1);

        let handle = Rc::new(ScriptedHandle {
            matches: Cell::new(self.state(query)),
            style: self.style.get(),
            listeners: RefCell::new(Vec::new()),
        });
        self.handles
            .borrow_mut()
            .push((query.to_string(), Rc::downgrade(&handle)));
        handle
    }
}
