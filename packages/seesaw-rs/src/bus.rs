//! Topic-keyed subscription table.
//!
//! # Guarantees
//!
//! - **Fixed wiring**: subscriptions are declared once through
//!   [`EventBusBuilder`] and cannot change after `build()`
//! - **Exact matching**: an event reaches exactly the effects subscribed to
//!   its topic, in subscription order
//! - **In-memory only**: nothing is persisted; a process restart loses
//!   in-flight events
//!
//! Delivery itself lives in [`crate::Engine`]; the bus only answers
//! "who listens to this topic".

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::core::Event;
use crate::effect_impl::Effect;
use crate::error::SeesawError;

type Handlers<E, D> = Vec<Arc<dyn Effect<E, D>>>;

/// Immutable mapping from topic to subscribed effects.
///
/// # Example
///
/// ```ignore
/// let bus = EventBus::builder()
///     .subscribe(ResolveChannel)
///     .subscribe(FetchVideos)
///     .build()?;
///
/// assert_eq!(bus.subscriber_count("submitted"), 1);
/// ```
pub struct EventBus<E: Event, D> {
    subscriptions: BTreeMap<&'static str, Handlers<E, D>>,
}

impl<E: Event, D: 'static> EventBus<E, D> {
    /// Start declaring subscriptions.
    pub fn builder() -> EventBusBuilder<E, D> {
        EventBusBuilder::new()
    }

    /// Effects subscribed to `topic`, in subscription order.
    pub fn handlers_for(&self, topic: &str) -> &[Arc<dyn Effect<E, D>>] {
        self.subscriptions
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the number of effects subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers_for(topic).len()
    }

    /// Topics with at least one subscriber, sorted.
    pub fn topics(&self) -> Vec<&'static str> {
        self.subscriptions.keys().copied().collect()
    }
}

impl<E: Event, D: 'static> std::fmt::Debug for EventBus<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wiring: BTreeMap<&str, Vec<&str>> = self
            .subscriptions
            .iter()
            .map(|(topic, handlers)| (*topic, handlers.iter().map(|h| h.name()).collect()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscriptions", &wiring)
            .finish()
    }
}

/// Builder collecting subscriptions before the bus is frozen.
pub struct EventBusBuilder<E: Event, D> {
    subscriptions: BTreeMap<&'static str, Handlers<E, D>>,
    names: HashSet<&'static str>,
    duplicate: Option<&'static str>,
}

impl<E: Event, D: 'static> EventBusBuilder<E, D> {
    fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            names: HashSet::new(),
            duplicate: None,
        }
    }

    /// Subscribe an effect to the topic it declares.
    pub fn subscribe<F>(self, effect: F) -> Self
    where
        F: Effect<E, D>,
    {
        self.subscribe_arc(Arc::new(effect))
    }

    /// Subscribe an already shared effect.
    pub fn subscribe_arc(mut self, effect: Arc<dyn Effect<E, D>>) -> Self {
        if !self.names.insert(effect.name()) && self.duplicate.is_none() {
            self.duplicate = Some(effect.name());
        }
        self.subscriptions
            .entry(effect.subscribes_to())
            .or_default()
            .push(effect);
        self
    }

    /// Freeze the subscription table.
    ///
    /// Fails if two effects share a name.
    pub fn build(self) -> Result<EventBus<E, D>, SeesawError> {
        if let Some(name) = self.duplicate {
            return Err(SeesawError::EffectAlreadyRegistered(name));
        }
        Ok(EventBus {
            subscriptions: self.subscriptions,
        })
    }
}
