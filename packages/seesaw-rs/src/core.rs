//! Core traits for the seesaw event-driven architecture.
//!
//! # Overview
//!
//! Every event is a fact published under a **topic**: a stable, lowercase
//! name such as `"submitted"` or `"channel_resolved"`. Handlers subscribe to
//! topics, never to Rust types, so the wiring reads the same in logs, in JSON
//! payloads and in code.
//!
//! # Correlation
//!
//! Every cascade started by one `emit` carries a single [`CorrelationId`].
//! Outcome events returned by effects inherit it, which lets logs and taps
//! group all work triggered by one inbound request.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::SeesawError;

/// Correlation ID for tracking related events across one cascade.
///
/// Use `CorrelationId::NONE` for uncorrelated events, or `CorrelationId::new()`
/// to generate a fresh ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Sentinel value for uncorrelated events.
    pub const NONE: Self = Self(Uuid::nil());

    /// Create a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Check if this is the NONE sentinel value.
    pub fn is_none(&self) -> bool {
        self.0.is_nil()
    }

    /// Check if this is a real correlation ID (not NONE).
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Get the inner UUID value.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A fact published on the bus under a named topic.
///
/// Implementors are usually one enum with a variant per topic. The topic name
/// is what subscriptions match on.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// #[serde(tag = "topic", content = "payload", rename_all = "snake_case")]
/// enum OrderEvent {
///     Placed { order_id: Uuid },
///     Shipped { order_id: Uuid, carrier: String },
/// }
///
/// impl Event for OrderEvent {
///     fn topic(&self) -> &'static str {
///         match self {
///             Self::Placed { .. } => "placed",
///             Self::Shipped { .. } => "shipped",
///         }
///     }
///
///     fn validate(&self) -> Result<(), String> {
///         match self {
///             Self::Shipped { carrier, .. } if carrier.trim().is_empty() => {
///                 Err("carrier must not be blank".into())
///             }
///             _ => Ok(()),
///         }
///     }
/// }
/// ```
pub trait Event: Clone + Send + Sync + 'static {
    /// Topic this event is published under.
    fn topic(&self) -> &'static str;

    /// Boundary validation, run before any handler sees the event.
    ///
    /// A rejected event is never delivered.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Decode a raw `(topic, payload)` pair into a typed event.
///
/// Implemented for every [`Event`] that deserializes from the adjacently
/// tagged shape `{"topic": "<name>", "payload": { ... }}`.
pub trait DecodeEvent: Event + Sized {
    /// Decode and validate. Fails with [`SeesawError::InvalidPayload`].
    fn decode(topic: &str, payload: serde_json::Value) -> Result<Self, SeesawError>;
}

impl<E> DecodeEvent for E
where
    E: Event + DeserializeOwned,
{
    fn decode(topic: &str, payload: serde_json::Value) -> Result<Self, SeesawError> {
        let tagged = serde_json::json!({ "topic": topic, "payload": payload });
        let event: E =
            serde_json::from_value(tagged).map_err(|e| SeesawError::InvalidPayload {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;

        if event.topic() != topic {
            return Err(SeesawError::InvalidPayload {
                topic: topic.to_string(),
                reason: format!("payload decoded as topic '{}'", event.topic()),
            });
        }

        event
            .validate()
            .map_err(|reason| SeesawError::InvalidPayload {
                topic: topic.to_string(),
                reason,
            })?;

        Ok(event)
    }
}

/// Envelope wrapping an event with transport metadata.
///
/// Domain event enums stay clean; correlation and timing live here.
#[derive(Debug, Clone)]
pub struct EventEnvelope<E> {
    /// Correlation ID shared by the whole cascade
    pub cid: CorrelationId,
    /// Topic copied from the event at wrap time
    pub topic: &'static str,
    /// When the envelope was created
    pub emitted_at: DateTime<Utc>,
    /// The event itself
    pub event: E,
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap an event under an existing correlation ID.
    pub fn new(cid: CorrelationId, event: E) -> Self {
        Self {
            cid,
            topic: event.topic(),
            emitted_at: Utc::now(),
            event,
        }
    }

    /// Wrap an event under a fresh correlation ID.
    pub fn new_random(event: E) -> Self {
        Self::new(CorrelationId::new(), event)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "topic", content = "payload", rename_all = "snake_case")]
    enum TestEvent {
        Ping { value: i32 },
        Pong { reply: String },
    }

    impl Event for TestEvent {
        fn topic(&self) -> &'static str {
            match self {
                Self::Ping { .. } => "ping",
                Self::Pong { .. } => "pong",
            }
        }

        fn validate(&self) -> Result<(), String> {
            match self {
                Self::Pong { reply } if reply.is_empty() => Err("reply is empty".into()),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn test_correlation_id_none() {
        assert!(CorrelationId::NONE.is_none());
        assert!(CorrelationId::new().is_some());
        assert_eq!(CorrelationId::NONE.to_string(), "NONE");
    }

    #[test]
    fn test_envelope_copies_topic() {
        let envelope = EventEnvelope::new_random(TestEvent::Ping { value: 1 });
        assert_eq!(envelope.topic, "ping");
        assert!(envelope.cid.is_some());
    }

    #[test]
    fn test_decode_valid_payload() {
        let event = TestEvent::decode("ping", serde_json::json!({ "value": 7 })).unwrap();
        assert_eq!(event, TestEvent::Ping { value: 7 });
    }

    #[test]
    fn test_decode_rejects_unknown_topic() {
        let err = TestEvent::decode("nope", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, SeesawError::InvalidPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let err = TestEvent::decode("ping", serde_json::json!({})).unwrap_err();
        match err {
            SeesawError::InvalidPayload { topic, .. } => assert_eq!(topic, "ping"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_runs_validation() {
        let err = TestEvent::decode("pong", serde_json::json!({ "reply": "" })).unwrap_err();
        match err {
            SeesawError::InvalidPayload { reason, .. } => assert_eq!(reason, "reply is empty"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
