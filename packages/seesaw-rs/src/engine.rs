//! Engine - the only emitter.
//!
//! The engine owns the frozen [`EventBus`], the taps and the shared
//! dependencies. Every `emit` starts a **cascade**:
//!
//! ```text
//! emit(event)
//!   → validate            (rejected: InvalidPayload, nothing delivered)
//!   → taps observe
//!   → every subscribed effect runs (concurrently)
//!   → each returned outcome event is dispatched the same way
//! ```
//!
//! A single dispatch delivers its event to all subscribed effects before any
//! outcome is published, so from an effect's point of view delivery is
//! synchronous. Different cascades (different jobs, different requests) run
//! independently.
//!
//! # Fire-and-Forget vs Await
//!
//! - `emit()`: spawns the cascade and returns its correlation ID immediately.
//! - `emit_and_await()`: drives the whole cascade before returning.
//!
//! Use `emit()` from request handlers that must answer before the work is
//! done; use `emit_and_await()` in tests and tools that need the final state.

use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::bus::{EventBus, EventBusBuilder};
use crate::core::{CorrelationId, DecodeEvent, Event, EventEnvelope};
use crate::effect_impl::{Effect, EffectContext};
use crate::error::SeesawError;
use crate::tap::{EventTap, TapContext};

/// Default limit on nested outcome events in one cascade.
pub const DEFAULT_MAX_DEPTH: usize = 64;

struct EngineInner<E: Event, D> {
    bus: EventBus<E, D>,
    taps: Vec<Arc<dyn EventTap<E>>>,
    deps: Arc<D>,
    max_depth: usize,
}

/// Cheap-to-clone handle on a running set of subscriptions.
pub struct Engine<E: Event, D> {
    inner: Arc<EngineInner<E, D>>,
}

impl<E: Event, D> Clone for Engine<E, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Event, D: Send + Sync + 'static> Engine<E, D> {
    /// Create a new engine builder.
    pub fn builder(deps: D) -> EngineBuilder<E, D> {
        EngineBuilder::new(deps)
    }

    /// The frozen subscription table.
    pub fn bus(&self) -> &EventBus<E, D> {
        &self.inner.bus
    }

    /// Shared dependencies handed to every effect.
    pub fn deps(&self) -> &D {
        &self.inner.deps
    }

    /// Emit an event (fire-and-forget).
    ///
    /// Must be called from inside a tokio runtime. Failures are logged.
    pub fn emit(&self, event: E) -> CorrelationId {
        let envelope = EventEnvelope::new_random(event);
        let cid = envelope.cid;
        let engine = self.clone();

        tokio::spawn(async move {
            if let Err(e) = engine.dispatch(envelope, 0).await {
                warn!(correlation_id = %cid, error = %e, "cascade finished with errors");
            }
        });

        cid
    }

    /// Emit an event and wait for the whole cascade to finish.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every delivery in the cascade completed
    /// - `Err` with the first failure otherwise; other branches still ran
    pub async fn emit_and_await(&self, event: E) -> Result<(), SeesawError> {
        self.dispatch(EventEnvelope::new_random(event), 0).await
    }

    /// Emit an event under an existing correlation ID and wait for it.
    pub async fn emit_correlated(&self, event: E, cid: CorrelationId) -> Result<(), SeesawError> {
        self.dispatch(EventEnvelope::new(cid, event), 0).await
    }

    /// Decode a raw `(topic, payload)` pair at the bus boundary, then emit
    /// it and wait.
    ///
    /// A payload that fails to decode or validate is rejected before any
    /// tap or effect sees it.
    pub async fn emit_raw(&self, topic: &str, payload: serde_json::Value) -> Result<(), SeesawError>
    where
        E: DecodeEvent,
    {
        let event = E::decode(topic, payload).inspect_err(|e| {
            warn!(%topic, error = %e, "rejected raw event");
        })?;
        self.emit_and_await(event).await
    }

    fn dispatch(
        &self,
        envelope: EventEnvelope<E>,
        depth: usize,
    ) -> BoxFuture<'static, Result<(), SeesawError>> {
        let engine = self.clone();
        let span = info_span!(
            "seesaw.dispatch",
            topic = envelope.topic,
            correlation_id = %envelope.cid,
            depth
        );

        async move {
            let topic = envelope.topic;
            let cid = envelope.cid;

            if depth > engine.inner.max_depth {
                error!("cascade too deep, dropping event");
                return Err(SeesawError::CascadeTooDeep {
                    topic,
                    max_depth: engine.inner.max_depth,
                });
            }

            if let Err(reason) = envelope.event.validate() {
                warn!(%reason, "event failed validation, not delivered");
                return Err(SeesawError::InvalidPayload {
                    topic: topic.to_string(),
                    reason,
                });
            }

            engine.run_taps(&envelope.event, TapContext::new(cid, depth)).await;

            let handlers: Vec<Arc<dyn Effect<E, D>>> =
                engine.inner.bus.handlers_for(topic).to_vec();
            if handlers.is_empty() {
                debug!("no subscribers");
                return Ok(());
            }

            let runs = handlers.into_iter().map(|handler| {
                let ctx = EffectContext::new(engine.inner.deps.clone(), cid);
                let event = envelope.event.clone();
                async move {
                    let name = handler.name();
                    (name, handler.handle(event, ctx).await)
                }
            });
            let results = join_all(runs).await;

            let mut first_error: Option<SeesawError> = None;
            let mut outcomes = Vec::new();
            for (effect, result) in results {
                match result {
                    Ok(Some(next)) => {
                        debug!(effect, next_topic = next.topic(), "effect produced outcome");
                        outcomes.push(next);
                    }
                    Ok(None) => debug!(effect, "effect dropped delivery"),
                    Err(e) => {
                        error!(effect, error = %e, "effect failed");
                        first_error.get_or_insert(SeesawError::EffectFailed {
                            effect,
                            topic,
                            message: e.to_string(),
                        });
                    }
                }
            }

            for next in outcomes {
                if let Err(e) = engine.dispatch(EventEnvelope::new(cid, next), depth + 1).await {
                    first_error.get_or_insert(e);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
        .instrument(span)
        .boxed()
    }

    async fn run_taps(&self, event: &E, ctx: TapContext) {
        for tap in &self.inner.taps {
            if let Err(e) = tap.on_event(event, &ctx).await {
                warn!(topic = event.topic(), error = %e, "event tap failed");
            }
        }
    }
}

impl<E: Event, D: 'static> std::fmt::Debug for Engine<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("bus", &self.inner.bus)
            .field("taps", &self.inner.taps.len())
            .field("max_depth", &self.inner.max_depth)
            .finish()
    }
}

// =============================================================================
// Engine Builder
// =============================================================================

/// Builder for constructing an [`Engine`].
///
/// # Example
///
/// ```ignore
/// let engine = Engine::builder(deps)
///     .with_effect(ResolveChannel)
///     .with_effect(FetchVideos)
///     .with_tap(LogTap)
///     .build()?;
///
/// engine.emit_and_await(MyEvent::Started { id }).await?;
/// ```
pub struct EngineBuilder<E: Event, D> {
    deps: Arc<D>,
    bus: EventBusBuilder<E, D>,
    taps: Vec<Arc<dyn EventTap<E>>>,
    max_depth: usize,
}

impl<E: Event, D: Send + Sync + 'static> EngineBuilder<E, D> {
    /// Create a builder owning `deps`.
    pub fn new(deps: D) -> Self {
        Self::with_arc(Arc::new(deps))
    }

    /// Create a builder from already shared dependencies.
    pub fn with_arc(deps: Arc<D>) -> Self {
        Self {
            deps,
            bus: EventBus::builder(),
            taps: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Subscribe an effect to the topic it declares.
    pub fn with_effect<F>(mut self, effect: F) -> Self
    where
        F: Effect<E, D>,
    {
        self.bus = self.bus.subscribe(effect);
        self
    }

    /// Add a tap that observes every validated event.
    pub fn with_tap<T>(self, tap: T) -> Self
    where
        T: EventTap<E>,
    {
        self.with_tap_arc(Arc::new(tap))
    }

    /// Add a shared tap (keep a clone to inspect it later).
    pub fn with_tap_arc(mut self, tap: Arc<dyn EventTap<E>>) -> Self {
        self.taps.push(tap);
        self
    }

    /// Override the nested-event limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Freeze subscriptions and build the engine.
    pub fn build(self) -> Result<Engine<E, D>, SeesawError> {
        let bus = self.bus.build()?;
        debug!(topics = ?bus.topics(), "seesaw engine built");
        Ok(Engine {
            inner: Arc::new(EngineInner {
                bus,
                taps: self.taps,
                deps: self.deps,
                max_depth: self.max_depth,
            }),
        })
    }
}
