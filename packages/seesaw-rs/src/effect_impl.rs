//! Effect trait and context.
//!
//! Effects are the units of work subscribed to a topic. They perform IO and
//! **return** their outcome event; the engine is the only emitter.
//!
//! # Key Properties
//!
//! - **One trigger, one outcome**: `Some(event)` is published next, `None`
//!   means the delivery was stale and is dropped
//! - **Stateless**: everything needed travels in the event or in `deps()`
//! - **Narrow context**: only `deps()` and `correlation_id()` are available

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{CorrelationId, Event};

/// Context passed to effect handlers.
///
/// # Immutability Invariant
///
/// `EffectContext` is **immutable and cheap to clone**. Clones are
/// semantically identical. Do not add per-invocation mutable state here.
///
/// Effects do NOT have access to:
/// - The bus (return the outcome instead)
/// - Other effects
/// - Taps
pub struct EffectContext<D> {
    deps: Arc<D>,
    cid: CorrelationId,
}

impl<D> EffectContext<D> {
    /// Create a new effect context.
    pub fn new(deps: Arc<D>, cid: CorrelationId) -> Self {
        Self { deps, cid }
    }

    /// Get shared dependencies.
    pub fn deps(&self) -> &D {
        &self.deps
    }

    /// Correlation ID of the cascade this invocation belongs to.
    pub fn correlation_id(&self) -> CorrelationId {
        self.cid
    }
}

impl<D> Clone for EffectContext<D> {
    fn clone(&self) -> Self {
        Self {
            deps: self.deps.clone(),
            cid: self.cid,
        }
    }
}

/// A handler subscribed to exactly one topic.
///
/// # Example
///
/// ```ignore
/// struct ShipOrder;
///
/// #[async_trait]
/// impl Effect<OrderEvent, Deps> for ShipOrder {
///     fn name(&self) -> &'static str { "ship_order" }
///     fn subscribes_to(&self) -> &'static str { "placed" }
///
///     async fn handle(&self, event: OrderEvent, ctx: EffectContext<Deps>) -> Result<Option<OrderEvent>> {
///         let OrderEvent::Placed { order_id } = event else { return Ok(None) };
///         let carrier = ctx.deps().shipping.book(order_id).await?;
///         Ok(Some(OrderEvent::Shipped { order_id, carrier }))
///     }
/// }
/// ```
#[async_trait]
pub trait Effect<E: Event, D>: Send + Sync + 'static {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Topic this effect reacts to.
    fn subscribes_to(&self) -> &'static str;

    /// Handle one delivery.
    ///
    /// Returning `Err` does not roll anything back and is never retried.
    async fn handle(&self, event: E, ctx: EffectContext<D>) -> Result<Option<E>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Deps {
        greeting: &'static str,
    }

    #[test]
    fn test_context_clone_shares_deps() {
        let cid = CorrelationId::new();
        let ctx = EffectContext::new(Arc::new(Deps { greeting: "hi" }), cid);
        let cloned = ctx.clone();

        assert_eq!(cloned.deps().greeting, "hi");
        assert_eq!(cloned.correlation_id(), cid);
    }
}
