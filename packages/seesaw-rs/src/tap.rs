//! Event Taps - observe facts without making decisions or mutating state.
//!
//! Taps provide a first-class way to observe events for:
//! - Logging and auditing
//! - Notifying external systems about terminal outcomes
//! - Recording events in tests
//!
//! # Execution Order
//!
//! Taps run **after** validation and **before** the subscribed effects:
//!
//! ```text
//! emit
//!  → validate (rejected events are never tapped)
//!  → Taps   ← here
//!  → Effects (may return the next event)
//! ```
//!
//! Tap errors are logged and never affect delivery.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{CorrelationId, Event};

/// Context provided to event taps.
///
/// Intentionally minimal - taps observe, they don't act.
/// No `emit()`, no `deps()`, no state mutation.
#[derive(Debug, Clone, Copy)]
pub struct TapContext {
    /// Correlation ID for the event (NONE if uncorrelated).
    pub correlation_id: CorrelationId,
    /// Nesting depth inside the cascade (0 for the event passed to `emit`).
    pub depth: usize,
}

impl TapContext {
    /// Create a new tap context.
    pub fn new(correlation_id: CorrelationId, depth: usize) -> Self {
        Self {
            correlation_id,
            depth,
        }
    }
}

/// Trait for observing events without side effects on the pipeline.
#[async_trait]
pub trait EventTap<E: Event>: Send + Sync + 'static {
    /// Called once per validated event.
    async fn on_event(&self, event: &E, ctx: &TapContext) -> Result<()>;
}
