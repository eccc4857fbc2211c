//! Testing utilities for seesaw engines.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! seesaw = { version = "0.2", features = ["testing"] }
//! ```
//!
//! # Waiting for Meaning, Not Time
//!
//! `emit()` is fire-and-forget, so a test cannot assert right after it.
//! Attach a [`RecordingTap`] and wait for the topic that ends the cascade:
//!
//! ```ignore
//! let tap = Arc::new(RecordingTap::new());
//! let engine = Engine::builder(deps).with_effect(Ship).with_tap_arc(tap.clone()).build()?;
//!
//! engine.emit(OrderEvent::Placed { id });
//! tap.wait_for_topic("shipped", Duration::from_secs(5)).await?;
//! ```

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::core::{CorrelationId, Event};
use crate::tap::{EventTap, TapContext};

/// An event observed by a [`RecordingTap`].
#[derive(Debug, Clone)]
pub struct Recorded<E> {
    pub event: E,
    pub correlation_id: CorrelationId,
    pub depth: usize,
}

/// Tap that keeps every validated event in arrival order.
pub struct RecordingTap<E: Event> {
    events: Mutex<Vec<Recorded<E>>>,
    notify: Notify,
}

impl<E: Event> RecordingTap<E> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Every recorded event with its cascade metadata.
    pub fn recorded(&self) -> Vec<Recorded<E>> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Every recorded event.
    pub fn events(&self) -> Vec<E> {
        self.recorded().into_iter().map(|r| r.event).collect()
    }

    /// Topics of every recorded event, in order.
    pub fn topics(&self) -> Vec<&'static str> {
        self.recorded().iter().map(|r| r.event.topic()).collect()
    }

    /// Recorded events published under `topic`.
    pub fn events_on(&self, topic: &str) -> Vec<E> {
        self.events()
            .into_iter()
            .filter(|e| e.topic() == topic)
            .collect()
    }

    /// Number of recorded events published under `topic`.
    pub fn count(&self, topic: &str) -> usize {
        self.events_on(topic).len()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Wait until an event satisfying `predicate` has been recorded.
    ///
    /// Returns the first matching event, or an error after `timeout`.
    pub async fn wait_for<F>(&self, timeout: Duration, predicate: F) -> Result<E>
    where
        F: Fn(&E) -> bool,
    {
        let wait = async {
            loop {
                // Register before checking so a concurrent record is not missed.
                let notified = self.notify.notified();
                if let Some(found) = self.events().into_iter().find(|e| predicate(e)) {
                    return found;
                }
                notified.await;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| anyhow!("no matching event within {:?}; saw {:?}", timeout, self.topics()))
    }

    /// Wait until an event on `topic` has been recorded.
    pub async fn wait_for_topic(&self, topic: &str, timeout: Duration) -> Result<E> {
        self.wait_for(timeout, |e| e.topic() == topic).await
    }
}

impl<E: Event> Default for RecordingTap<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Event> EventTap<E> for RecordingTap<E> {
    async fn on_event(&self, event: &E, ctx: &TapContext) -> Result<()> {
        self.events
            .lock()
            .map_err(|e| anyhow!("recording tap poisoned: {}", e))?
            .push(Recorded {
                event: event.clone(),
                correlation_id: ctx.correlation_id,
                depth: ctx.depth,
            });
        self.notify.notify_waiters();
        Ok(())
    }
}
