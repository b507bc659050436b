//! # viewport-media - Breakpoint matching for responsive hosts
//!
//! viewport-media keeps a set of named breakpoints in sync with the host's
//! native media-query evaluator. It exposes which breakpoints currently match,
//! a derived `is<Name>` flag per breakpoint, a `media-*` class-name string, and
//! a coalesced "mediaChanged" notification.
//!
//! ## Core Concepts
//!
//! - **Breakpoint**: a named viewport condition bound to a query expression
//! - **QueryHandle**: the evaluator's live handle for one query
//! - **MatchSet**: the ordered, duplicate-free set of matching breakpoint names
//! - **Mock mode**: deterministic synthetic state for tests of dependent code
//!
//! ## Usage
//!
//! ```rust
//! use std::rc::Rc;
//! use viewport_media::{BreakpointTable, MediaConfig, MediaEvaluator, MediaService, ScriptedEnvironment};
//!
//! let env = Rc::new(ScriptedEnvironment::new());
//! env.set_matches("(max-width: 767px)", true);
//!
//! let table = BreakpointTable::from_pairs([("mobile", "(max-width: 767px)")])?;
//! let evaluator: Rc<dyn MediaEvaluator> = env.clone();
//! let media = MediaService::new(MediaConfig::with_breakpoints(table), Some(evaluator));
//!
//! assert!(media.is_matching("mobile"));
//! assert_eq!(media.class_names(), "media-mobile");
//! # Ok::<(), viewport_media::MediaError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod breakpoint;
pub mod casing;
pub mod config;
pub mod environment;
pub mod error;
pub mod media;

// Re-export primary types at crate root for convenience
pub use breakpoint::{Breakpoint, BreakpointName, BreakpointTable};
pub use config::{MediaConfig, MockConfig};
pub use environment::{ChangeListener, MediaEvaluator, QueryHandle, ScriptedEnvironment, SubscriptionStyle};
pub use error::{ConfigError, DeliveryError, MediaError, MediaResult, ValidationError};
pub use media::{
    Lifecycle, MatchSet, MediaEvent, MediaService, MediaStream, Subscription, SubscriptionId,
};
