//! The media service.
//!
//! `MediaService` ties the registry, the match state and the notification hub
//! together behind one cheaply cloneable handle. Everything runs on the host's
//! single event thread: native listeners and registration mutate state
//! synchronously, and notifications wait for an explicit [`MediaService::flush`].

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::breakpoint::{Breakpoint, BreakpointName};
use crate::casing;
use crate::config::MediaConfig;
use crate::environment::{self, ChangeListener, MediaEvaluator, SubscriptionStyle};
use crate::error::{MediaResult, ValidationError};

use super::events::{MediaEvent, SubscriptionId};
use super::notify::{ChangeCallback, NotificationHub};
use super::registry::{Generation, Registry, RegistryEntry};
use super::state::{Lifecycle, MatchSet, MatchState};
use super::stream::MediaStream;

struct Core {
    registry: Registry,
    state: MatchState,
    hub: NotificationHub,
}

/// Ids whose guard was dropped while the core was borrowed.
type Deferred = Rc<RefCell<Vec<SubscriptionId>>>;

/// Keeps a set of named breakpoints in sync with the host's query evaluator.
#[derive(Clone)]
pub struct MediaService {
    core: Rc<RefCell<Core>>,
    deferred: Deferred,
    evaluator: Option<Rc<dyn MediaEvaluator>>,
}

/// Guard for an [`MediaService::on_change`] callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the callback"]
pub struct Subscription {
    id: SubscriptionId,
    core: Weak<RefCell<Core>>,
    deferred: Weak<RefCell<Vec<SubscriptionId>>>,
}

impl Subscription {
    /// Id of the subscribed callback.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Explicit unsubscription; equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(core) = self.core.upgrade() else {
            return;
        };
        // Core is borrowed further up the stack: the service removes the id
        // before its next delivery.
        let removed = match core.try_borrow_mut() {
            Ok(mut core) => core.hub.remove_callback(self.id),
            Err(_) => {
                if let Some(deferred) = self.deferred.upgrade() {
                    trace!(subscription = ?self.id, "core busy; deferring unsubscribe");
                    deferred.borrow_mut().push(self.id);
                }
                None
            }
        };
        drop(removed);
    }
}

impl MediaService {
    /// Builds the service and registers every configured breakpoint in table
    /// order. `evaluator = None` yields a disabled service.
    #[must_use]
    pub fn new(config: MediaConfig, evaluator: Option<Rc<dyn MediaEvaluator>>) -> Self {
        let MediaConfig {
            breakpoints,
            mock,
            stream_capacity,
        } = config;

        let service = Self {
            core: Rc::new(RefCell::new(Core {
                registry: Registry::new(),
                state: MatchState::new(mock),
                hub: NotificationHub::new(stream_capacity),
            })),
            deferred: Rc::default(),
            evaluator,
        };

        for breakpoint in &breakpoints {
            service.register_breakpoint(breakpoint.clone());
        }
        service
    }

    /// A service without an evaluator: every registration is inert.
    #[must_use]
    pub fn disabled(config: MediaConfig) -> Self {
        Self::new(config, None)
    }

    /// Whether a native evaluator is available.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.evaluator.is_some()
    }

    /// Registers `query` under `name`, replacing any previous registration.
    ///
    /// Only malformed input is an error. Without an evaluator, while mocking,
    /// or after teardown the call succeeds and does nothing beyond recording
    /// `name` as a known breakpoint.
    pub fn register(&self, name: &str, query: &str) -> MediaResult<()> {
        let breakpoint = Breakpoint::new(name, query)?;
        self.register_breakpoint(breakpoint);
        Ok(())
    }

    fn register_breakpoint(&self, breakpoint: Breakpoint) {
        let Breakpoint { name, query } = breakpoint;

        let (evaluator, generation) = {
            let mut core = self.core.borrow_mut();
            if !core.state.is_active() {
                debug!(breakpoint = %name, "ignoring registration after teardown");
                return;
            }
            core.registry.declare(&name);

            if core.state.mock().is_active() {
                debug!(breakpoint = %name, "mock mode active; registration is inert");
                return;
            }
            let Some(evaluator) = self.evaluator.as_ref() else {
                debug!(breakpoint = %name, "no media evaluator; registration is inert");
                return;
            };
            let generation = core.registry.next_generation();
            (evaluator, generation)
        };

        let handle = evaluator.evaluate(&query);
        let listener = make_listener(Rc::downgrade(&self.core), name.clone(), generation);
        let style = environment::subscribe(handle.as_ref(), &listener);
        if style == SubscriptionStyle::Unsupported {
            debug!(breakpoint = %name, %query, "handle supports no change subscription; state will not update");
        }
        debug!(breakpoint = %name, %query, %style, generation, "registered breakpoint");

        let initial = handle.matches();
        let replaced = self.core.borrow_mut().registry.install(
            name,
            RegistryEntry {
                query,
                handle,
                listener: Rc::clone(&listener),
                generation,
                style,
            },
        );
        drop(replaced);

        listener(initial);
    }

    /// Names currently matching, in the order they started matching.
    ///
    /// While mocking with nothing recorded, this is the synthetic breakpoint.
    #[must_use]
    pub fn matches(&self) -> Vec<String> {
        self.core.borrow().state.matches()
    }

    /// The recorded set, without the mock fallback.
    #[must_use]
    pub fn match_set(&self) -> MatchSet {
        self.core.borrow().state.set().clone()
    }

    /// `media-<dasherized name>` for every match, space separated.
    #[must_use]
    pub fn class_names(&self) -> String {
        self.core.borrow().state.class_names()
    }

    /// Whether `name` is in [`Self::matches`].
    #[must_use]
    pub fn is_matching(&self, name: &str) -> bool {
        self.core.borrow().state.is_matching(name)
    }

    /// `(is<Name>, matching)` for every known breakpoint, in registration order.
    #[must_use]
    pub fn flags(&self) -> Vec<(String, bool)> {
        let core = self.core.borrow();
        let matches = core.state.matches();
        core.registry
            .known()
            .iter()
            .map(|name| (name.flag_name(), matches.iter().any(|m| name == m.as_str())))
            .collect()
    }

    /// Looks up a derived flag by its synthesized name, e.g. `isMobile`.
    #[must_use]
    pub fn flag(&self, flag_name: &str) -> Option<bool> {
        self.flags()
            .into_iter()
            .find(|(flag, _)| flag == flag_name)
            .map(|(_, value)| value)
    }

    /// Whether `name` is a known breakpoint.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.core.borrow().registry.is_known(name)
    }

    /// Known breakpoint names in registration order.
    #[must_use]
    pub fn breakpoints(&self) -> Vec<String> {
        self.core
            .borrow()
            .registry
            .known()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of breakpoints holding a native handle.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.core.borrow().registry.len()
    }

    /// Query currently registered for `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        self.core.borrow().registry.get(name).map(|e| e.query.clone())
    }

    /// Live state of the native handle for `name`, read directly from it.
    #[must_use]
    pub fn handle_matches(&self, name: &str) -> Option<bool> {
        let handle = Rc::clone(&self.core.borrow().registry.get(name)?.handle);
        Some(handle.matches())
    }

    /// Subscription mechanism the handle for `name` accepted.
    #[must_use]
    pub fn subscription_style(&self, name: &str) -> Option<SubscriptionStyle> {
        self.core.borrow().registry.get(name).map(|e| e.style)
    }

    /// Calls `callback` on every delivered notification until the returned
    /// guard is dropped.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MediaEvent) + 'static,
    {
        self.remove_deferred();
        let callback: ChangeCallback = Rc::new(callback);
        let id = self.core.borrow_mut().hub.add_callback(callback);
        Subscription {
            id,
            core: Rc::downgrade(&self.core),
            deferred: Rc::downgrade(&self.deferred),
        }
    }

    fn remove_deferred(&self) {
        let ids = mem::take(&mut *self.deferred.borrow_mut());
        if ids.is_empty() {
            return;
        }
        let removed: Vec<ChangeCallback> = {
            let mut core = self.core.borrow_mut();
            ids.into_iter().filter_map(|id| core.hub.remove_callback(id)).collect()
        };
        debug!(removed = removed.len(), "applied deferred unsubscribes");
        drop(removed);
    }

    /// Opens a channel-backed subscription. After teardown the stream is
    /// returned already disconnected.
    #[must_use]
    pub fn stream(&self) -> MediaStream {
        let mut core = self.core.borrow_mut();
        let stream = core.hub.open_stream();
        if !core.state.is_active() {
            drop(core.hub.close());
        }
        stream
    }

    /// Delivers the pending notification, if any. Returns whether one was
    /// delivered.
    ///
    /// A callback that tears the service down stops delivery to the
    /// callbacks after it.
    pub fn flush(&self) -> bool {
        self.remove_deferred();
        let (event, callbacks) = {
            let mut core = self.core.borrow_mut();
            if !core.state.is_active() {
                return false;
            }
            match core.hub.take_pending() {
                Some(delivery) => delivery,
                None => return false,
            }
        };

        trace!(sequence = event.sequence, subscribers = callbacks.len(), "delivering {}", MediaEvent::NAME);
        for callback in &callbacks {
            if !self.core.borrow().state.is_active() {
                trace!(sequence = event.sequence, "service torn down mid-delivery");
                break;
            }
            callback(&event);
        }
        true
    }

    /// Whether a change is waiting for [`Self::flush`].
    #[must_use]
    pub fn has_pending_notification(&self) -> bool {
        self.core.borrow().hub.is_pending()
    }

    /// Stream deliveries dropped because a subscriber buffer was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.core.borrow().hub.dropped_events()
    }

    /// Number of live callbacks and streams.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.remove_deferred();
        self.core.borrow().hub.subscriber_count()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.core.borrow().state.lifecycle()
    }

    /// Tears the service down. Pending notifications are discarded, streams
    /// disconnect, callbacks are released, and every later native change,
    /// registration and flush is ignored. Idempotent.
    pub fn teardown(&self) {
        let callbacks = {
            let mut core = self.core.borrow_mut();
            if core.state.lifecycle() == Lifecycle::Destroyed {
                return;
            }
            core.state.set_lifecycle(Lifecycle::Destroying);
            let callbacks = core.hub.close();
            core.state.set_lifecycle(Lifecycle::Destroyed);
            callbacks
        };
        debug!(released = callbacks.len(), "media service torn down");
        drop(callbacks);
    }

    /// Switches the mock fallback on or off.
    pub fn set_mocked(&self, mocked: bool) {
        self.update_mock(|mock| mock.mocked = mocked);
    }

    /// Changes the synthetic breakpoint reported while mocking.
    pub fn set_mocked_breakpoint(&self, name: &str) {
        let name = name.to_string();
        self.update_mock(move |mock| mock.breakpoint = name);
    }

    fn update_mock(&self, apply: impl FnOnce(&mut crate::config::MockConfig)) {
        let mut core = self.core.borrow_mut();
        if !core.state.is_active() {
            return;
        }
        let before = core.state.matches();
        apply(core.state.mock_mut());
        if core.state.matches() != before {
            core.hub.mark_pending();
        }
    }

    /// Forces the recorded matches to exactly `names`, as a test helper for
    /// code depending on the service. Every name must be a known breakpoint.
    ///
    /// Only honored while mocking; a live service keeps the matches its
    /// handles report and ignores the call.
    pub fn set_breakpoints<S: AsRef<str>>(&self, names: &[S]) -> MediaResult<()> {
        let mut core = self.core.borrow_mut();

        let mut validated = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !core.registry.is_known(name) {
                return Err(ValidationError::UnknownBreakpoint {
                    name: name.to_string(),
                }
                .into());
            }
            validated.push(BreakpointName::new(name)?);
        }

        if !core.state.mock().is_active() {
            debug!(requested = validated.len(), "mock mode inactive; ignoring set_breakpoints");
            return Ok(());
        }
        if core.state.replace(&validated) {
            core.hub.mark_pending();
        }
        Ok(())
    }

    /// Synthesized flag name for `name`.
    #[must_use]
    pub fn flag_name(name: &str) -> String {
        casing::flag_name(name)
    }
}

fn make_listener(core: Weak<RefCell<Core>>, name: BreakpointName, generation: Generation) -> ChangeListener {
    Rc::new(move |is_matching: bool| {
        let Some(core) = core.upgrade() else {
            trace!(breakpoint = %name, "service dropped; ignoring change");
            return;
        };
        on_match_changed(&core, &name, generation, is_matching);
    })
}

fn on_match_changed(core: &RefCell<Core>, name: &BreakpointName, generation: Generation, is_matching: bool) {
    let mut core = core.borrow_mut();
    if !core.state.is_active() {
        trace!(breakpoint = %name, is_matching, "ignoring change after teardown");
        return;
    }
    if !core.registry.is_current(name, generation) {
        trace!(breakpoint = %name, generation, "ignoring change from replaced registration");
        return;
    }
    if core.state.on_match_changed(name, is_matching) {
        trace!(breakpoint = %name, is_matching, "match set changed");
        core.hub.mark_pending();
    }
}
