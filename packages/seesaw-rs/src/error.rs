//! Structured error types for seesaw.
//!
//! `SeesawError` provides pattern-matchable errors instead of generic
//! `anyhow::Error` at the bus boundary.
//!
//! # The Error Boundary Rule
//!
//! > **No `anyhow::Error` ever crosses the EventBus boundary.**
//!
//! - `anyhow` is internal transport (ergonomic for effects)
//! - Effects turn expected failures into failure *events* themselves
//! - Anything an effect still returns as `Err` is logged and reported as
//!   [`SeesawError::EffectFailed`] with the message only
//!
//! # Example
//!
//! ```ignore
//! match engine.emit_raw("submitted", payload).await {
//!     Ok(()) => {}
//!     Err(SeesawError::InvalidPayload { topic, reason }) => {
//!         tracing::warn!(%topic, %reason, "rejected malformed event");
//!     }
//!     Err(e) => tracing::error!(error = %e, "cascade failed"),
//! }
//! ```

use thiserror::Error;

/// Errors produced by the bus and the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SeesawError {
    /// Payload failed to decode or failed event validation. Nothing was delivered.
    #[error("invalid payload for topic '{topic}': {reason}")]
    InvalidPayload { topic: String, reason: String },

    /// Two effects registered under the same name.
    #[error("effect '{0}' is already registered")]
    EffectAlreadyRegistered(&'static str),

    /// A cascade kept producing events past the configured depth.
    #[error("cascade exceeded {max_depth} nested events at topic '{topic}'")]
    CascadeTooDeep { topic: &'static str, max_depth: usize },

    /// An effect returned an error instead of an outcome event.
    #[error("effect '{effect}' failed on topic '{topic}': {message}")]
    EffectFailed {
        effect: &'static str,
        topic: &'static str,
        message: String,
    },
}

impl SeesawError {
    /// Returns true if the error was raised before any handler ran.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SeesawError::InvalidPayload { .. })
    }
}
