//! Match state: the ordered set of matching breakpoints and everything
//! derived from it.

use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointName;
use crate::config::MockConfig;

/// Service lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Accepting registrations and native changes.
    Active,
    /// Teardown has begun.
    Destroying,
    /// Teardown finished. Terminal.
    Destroyed,
}

/// Ordered, duplicate-free set of matching breakpoint names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    names: Vec<BreakpointName>,
}

impl MatchSet {
    /// Appends `name` unless present. Returns whether membership changed.
    pub fn insert(&mut self, name: &BreakpointName) -> bool {
        if self.contains(name.as_str()) {
            return false;
        }
        self.names.push(name.clone());
        true
    }

    /// Removes `name`. Returns whether membership changed.
    pub fn remove(&mut self, name: &BreakpointName) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    /// Replaces the contents, deduplicating while keeping first occurrences.
    /// Returns whether membership or order changed.
    pub fn replace(&mut self, names: &[BreakpointName]) -> bool {
        let mut next = Self::default();
        for name in names {
            next.insert(name);
        }
        if next == *self {
            return false;
        }
        *self = next;
        true
    }

    /// Whether `name` is recorded as matching.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterates in the order names started matching.
    pub fn iter(&self) -> std::slice::Iter<'_, BreakpointName> {
        self.names.iter()
    }

    /// Number of matching names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub(crate) struct MatchState {
    set: MatchSet,
    lifecycle: Lifecycle,
    mock: MockConfig,
}

impl MatchState {
    pub(crate) fn new(mock: MockConfig) -> Self {
        Self {
            set: MatchSet::default(),
            lifecycle: Lifecycle::Active,
            mock,
        }
    }

    /// Applies one listener delivery. Returns whether the set changed.
    pub(crate) fn on_match_changed(&mut self, name: &BreakpointName, is_matching: bool) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        if is_matching {
            self.set.insert(name)
        } else {
            self.set.remove(name)
        }
    }

    /// Overwrites the recorded matches. Returns whether anything changed.
    pub(crate) fn replace(&mut self, names: &[BreakpointName]) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        self.set.replace(names)
    }

    /// Recorded matches, or the synthetic breakpoint while mocking with
    /// nothing recorded.
    pub(crate) fn matches(&self) -> Vec<String> {
        if self.set.is_empty() {
            if self.mock.is_active() {
                return vec![self.mock.breakpoint.clone()];
            }
            return Vec::new();
        }
        self.set.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn is_matching(&self, name: &str) -> bool {
        self.matches().iter().any(|m| m == name)
    }

    pub(crate) fn class_names(&self) -> String {
        self.matches()
            .iter()
            .map(|m| crate::casing::class_name(m))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) const fn set(&self) -> &MatchSet {
        &self.set
    }

    pub(crate) const fn mock(&self) -> &MockConfig {
        &self.mock
    }

    pub(crate) fn mock_mut(&mut self) -> &mut MockConfig {
        &mut self.mock
    }

    pub(crate) const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }
}
