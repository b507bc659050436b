//! Error types for viewport-media.
//!
//! Errors are strongly typed using thiserror. Note that most degraded
//! conditions (no evaluator, unsupported subscription style, events after
//! teardown) are not errors at all: they surface only as observable state.

use thiserror::Error;

/// Validation errors raised for malformed breakpoint input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Breakpoint name was empty.
    #[error("Breakpoint name cannot be empty")]
    EmptyBreakpointName,

    /// Breakpoint name is not an ASCII identifier.
    #[error("Breakpoint name '{name}' is not a valid identifier")]
    InvalidBreakpointName {
        /// Rejected name.
        name: String,
    },

    /// Query expression was blank.
    #[error("Query for breakpoint '{name}' cannot be empty")]
    EmptyQuery {
        /// Breakpoint the query belonged to.
        name: String,
    },

    /// Name does not belong to any known breakpoint.
    #[error("Breakpoint \"{name}\" is not defined in the breakpoint table")]
    UnknownBreakpoint {
        /// Unknown name.
        name: String,
    },
}

/// Errors loading a media configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not a valid config.
    #[error("Failed to parse media config: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// Two table entries share a name.
    #[error("Breakpoint '{name}' is defined more than once")]
    DuplicateBreakpoint {
        /// Duplicated name.
        name: String,
    },
}

/// Errors receiving from a subscriber stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The service side of the stream is gone.
    #[error("Media stream disconnected")]
    Disconnected,

    /// Nothing arrived before the timeout.
    #[error("No media event received within {duration_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        duration_ms: u64,
    },

    /// Nothing is buffered right now.
    #[error("No media event pending")]
    Empty,
}

/// Top-level error type for viewport-media.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Stream receive failure.
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl MediaError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a delivery error.
    #[must_use]
    pub const fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Delivery(e) => matches!(e, DeliveryError::Timeout { .. } | DeliveryError::Empty),
            Self::Validation(_) | Self::Config(_) => false,
        }
    }
}

/// Result type alias for viewport-media operations.
pub type MediaResult<T> = Result<T, MediaError>;
