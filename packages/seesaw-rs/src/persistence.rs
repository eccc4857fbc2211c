//! Keyed state storage with optimistic concurrency.
//!
//! # The Contract
//!
//! 1. **Load before write.** Callers read the current value and its
//!    [`Revision`], compute the next value, then `save` with the revision
//!    they loaded.
//!
//! 2. **Conflicts are expected.** If another writer saved in between, `save`
//!    returns [`StoreError::Conflict`] and stores nothing. Reload and retry.
//!
//! 3. **Backend failures are not conflicts.** [`StoreError::Backend`] means
//!    the store itself failed and retrying the same decision will not help.
//!
//! # What This Does NOT Guarantee
//!
//! - No durability across restarts for [`InMemoryStore`].
//! - No transactions spanning more than one key.

use std::hash::Hash;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Errors from state storage.
///
/// - [`StoreError::Conflict`] means another writer modified the key since it
///   was loaded. The caller should reload and decide again.
/// - [`StoreError::Backend`] means storage failed (timeout, connection,
///   serialization).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer modified the value since we loaded it.
    #[error("revision conflict: state was modified concurrently")]
    Conflict,

    /// Storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Backend(err)
    }
}

// =============================================================================
// Revision
// =============================================================================

/// Revision for optimistic concurrency control.
///
/// - [`Revision::NONE`] means the key has never been saved.
/// - Every successful save advances the revision by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(pub u64);

impl Revision {
    /// Sentinel value for a key that has never been saved.
    pub const NONE: Revision = Revision(0);

    /// Get the next revision.
    pub fn next(self) -> Self {
        Revision(self.0.saturating_add(1))
    }

    /// Check if this is the NONE sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Get the inner value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else {
            write!(f, "r{}", self.0)
        }
    }
}

/// A stored value together with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<V> {
    pub value: V,
    pub revision: Revision,
}

// =============================================================================
// State Store
// =============================================================================

/// Persists keyed state.
///
/// Implementations must make `save` atomic: the revision check and the write
/// happen together or not at all.
#[async_trait]
pub trait StateStore<K, V>: Send + Sync + 'static
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Load the value for `key`, or `None` if it was never saved.
    async fn load(&self, key: &K) -> Result<Option<Versioned<V>>, StoreError>;

    /// Save `value` if the stored revision still equals `expected`.
    ///
    /// Use [`Revision::NONE`] to create a key that must not exist yet.
    /// Returns the new revision.
    async fn save(&self, key: &K, value: V, expected: Revision) -> Result<Revision, StoreError>;

    /// Overwrite `value` regardless of the stored revision.
    async fn put(&self, key: &K, value: V) -> Result<Revision, StoreError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store backed by a sharded concurrent map.
pub struct InMemoryStore<K, V>
where
    K: Eq + Hash,
{
    data: DashMap<K, Versioned<V>>,
}

impl<K: Eq + Hash, V> InMemoryStore<K, V> {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for InMemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> StateStore<K, V> for InMemoryStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn load(&self, key: &K) -> Result<Option<Versioned<V>>, StoreError> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn save(&self, key: &K, value: V, expected: Revision) -> Result<Revision, StoreError> {
        match self.data.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().revision != expected {
                    return Err(StoreError::Conflict);
                }
                let revision = expected.next();
                occupied.insert(Versioned { value, revision });
                Ok(revision)
            }
            Entry::Vacant(vacant) => {
                if !expected.is_none() {
                    return Err(StoreError::Conflict);
                }
                let revision = Revision::NONE.next();
                vacant.insert(Versioned { value, revision });
                Ok(revision)
            }
        }
    }

    async fn put(&self, key: &K, value: V) -> Result<Revision, StoreError> {
        let mut slot = self.data.entry(key.clone()).or_insert(Versioned {
            value: value.clone(),
            revision: Revision::NONE,
        });
        let revision = slot.revision.next();
        *slot = Versioned { value, revision };
        Ok(revision)
    }
}
