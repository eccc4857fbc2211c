//! # Seesaw
//!
//! A small, in-process, event-driven coordination layer: facts are published
//! under named topics, effects subscribed to a topic do the IO, and each
//! effect **returns** the next fact instead of emitting it.
//!
//! ## Architecture
//!
//! ```text
//! Edge (HTTP handler)
//!     │
//!     ▼ emit()
//! Engine ───────────────────────────────────────┐
//!     │                                         │
//!     ├─► validate() ── rejected ─► InvalidPayload
//!     │                                         │
//!     ├─► taps observe                          │
//!     │                                         │
//!     └─► EventBus.handlers_for(topic)          │
//!             │                                 │
//!             ├─► Effect A.handle() ─► Some(next) ┤
//!             └─► Effect B.handle() ─► None     │
//!                                               │
//!                 next is dispatched ◄──────────┘
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Events are facts** - immutable, topic-named, validated at the boundary
//! 2. **Wiring is fixed** - subscriptions are frozen when the engine is built
//! 3. **Effects return outcomes** - the engine is the only emitter
//! 4. **One correlation ID per cascade** - outcomes inherit it
//!
//! ## Guarantees
//!
//! - **At-least-once delivery within a process**: every subscriber sees each
//!   emitted event, and the same fact may be emitted again (`emit_raw`,
//!   redelivered triggers). Events live in memory only and do not survive a
//!   restart.
//! - **No retries**: an effect that fails is logged and reported, not re-run
//!
//! Effects must tolerate duplicates: keep workflow status in a
//! [`StateStore`] and check it before acting.
//!
//! ## Example
//!
//! ```ignore
//! use seesaw::{Effect, EffectContext, Engine, Event};
//!
//! #[derive(Debug, Clone)]
//! enum OrderEvent {
//!     Placed { id: u64 },
//!     Shipped { id: u64 },
//! }
//!
//! impl Event for OrderEvent {
//!     fn topic(&self) -> &'static str {
//!         match self {
//!             OrderEvent::Placed { .. } => "placed",
//!             OrderEvent::Shipped { .. } => "shipped",
//!         }
//!     }
//! }
//!
//! struct Ship;
//!
//! #[async_trait::async_trait]
//! impl Effect<OrderEvent, Deps> for Ship {
//!     fn name(&self) -> &'static str { "ship" }
//!     fn subscribes_to(&self) -> &'static str { "placed" }
//!
//!     async fn handle(&self, event: OrderEvent, ctx: EffectContext<Deps>) -> anyhow::Result<Option<OrderEvent>> {
//!         let OrderEvent::Placed { id } = event else { return Ok(None) };
//!         ctx.deps().warehouse.ship(id).await?;
//!         Ok(Some(OrderEvent::Shipped { id }))
//!     }
//! }
//!
//! let engine = Engine::builder(deps).with_effect(Ship).build()?;
//! engine.emit(OrderEvent::Placed { id: 1 });
//! ```

mod bus;
mod core;
mod effect_impl;
mod engine;
mod error;
mod persistence;
mod tap;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::bus::{EventBus, EventBusBuilder};
pub use crate::core::{CorrelationId, DecodeEvent, Event, EventEnvelope};
pub use effect_impl::{Effect, EffectContext};
pub use engine::{Engine, EngineBuilder, DEFAULT_MAX_DEPTH};
pub use error::SeesawError;
pub use persistence::{InMemoryStore, Revision, StateStore, StoreError, Versioned};
pub use tap::{EventTap, TapContext};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
