//! Breakpoint registry.
//!
//! Owns one entry per registered breakpoint: the query, the handle returned by
//! the evaluator, the listener wired onto it and the subscription style the
//! handle accepted. Re-registering a name replaces its entry. The old handle
//! keeps its subscription, but its listener carries a stale generation and is
//! ignored from then on.

use std::collections::HashMap;
use std::rc::Rc;

use crate::breakpoint::BreakpointName;
use crate::environment::{ChangeListener, QueryHandle, SubscriptionStyle};

/// Identifies one registration of a breakpoint name.
pub(crate) type Generation = u64;

pub(crate) struct RegistryEntry {
    pub query: String,
    pub handle: Rc<dyn QueryHandle>,
    /// Kept alive for as long as the handle is referenced here.
    #[allow(dead_code)]
    pub listener: ChangeListener,
    pub generation: Generation,
    pub style: SubscriptionStyle,
}

#[derive(Default)]
pub(crate) struct Registry {
    /// Every name ever declared, in first-declaration order.
    known: Vec<BreakpointName>,
    entries: HashMap<BreakpointName, RegistryEntry>,
    last_generation: Generation,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `name` as a known breakpoint, whether or not it gets a handle.
    pub(crate) fn declare(&mut self, name: &BreakpointName) {
        if !self.known.contains(name) {
            self.known.push(name.clone());
        }
    }

    /// Reserves the generation for an upcoming registration.
    pub(crate) fn next_generation(&mut self) -> Generation {
        self.last_generation += 1;
        self.last_generation
    }

    /// Installs `entry`, returning the entry it replaced.
    pub(crate) fn install(&mut self, name: BreakpointName, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.declare(&name);
        self.entries.insert(name, entry)
    }

    /// Whether a listener of `generation` still speaks for `name`.
    pub(crate) fn is_current(&self, name: &BreakpointName, generation: Generation) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.generation == generation)
    }

    pub(crate) fn is_known(&self, name: &str) -> bool {
        self.known.iter().any(|n| n == name)
    }

    pub(crate) fn known(&self) -> &[BreakpointName] {
        &self.known
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegistryEntry> {
        let name = BreakpointName::new(name).ok()?;
        self.entries.get(&name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
