//! Collaborator stores
//!
//! The resource store is the single source of truth for shared mutable
//! state; the reconcilers never hold authoritative state in memory
//! across passes. [`Collection`] is the in-process implementation of
//! the store contract the controller needs: get, create, version-checked
//! updates, list, and a change feed. A durable store would sit behind
//! the same surface.

mod secrets;

pub use secrets::{credit_card_from_secret, MemorySecrets, SecretStore};

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;

use shared::{Error, Resource, ResourceKey, Result};

/// Capacity of the change-feed channel; a lagging engine falls back to
/// full resync, so losing feed entries is safe.
const CHANGE_FEED_CAPACITY: usize = 256;

/// Typed collection of one resource kind
pub struct Collection<T: Resource> {
    items: DashMap<ResourceKey, T>,
    changes: broadcast::Sender<ResourceKey>,
}

impl<T: Resource> Collection<T> {
    pub fn new() -> Arc<Self> {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Arc::new(Self {
            items: DashMap::new(),
            changes,
        })
    }

    /// Fetch a resource by key
    pub fn get(&self, key: &ResourceKey) -> Result<T> {
        self.items
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::not_found(T::KIND, key.to_string()))
    }

    /// Create a resource; fails if the key is taken
    pub fn create(&self, mut resource: T) -> Result<T> {
        let key = resource.key();
        resource.meta_mut().resource_version = 1;

        match self.items.entry(key.clone()) {
            Entry::Occupied(_) => Err(Error::already_exists(T::KIND, key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(resource.clone());
                let _ = self.changes.send(key);
                Ok(resource)
            }
        }
    }

    /// Create, or fetch the existing resource on a name collision
    ///
    /// The conversion of `AlreadyExists` into "use what's there" is what
    /// makes discovery idempotent.
    pub fn find_or_create(&self, resource: T) -> Result<T> {
        let key = resource.key();
        match self.create(resource) {
            Ok(created) => Ok(created),
            Err(Error::AlreadyExists { .. }) => self.get(&key),
            Err(e) => Err(e),
        }
    }

    /// Replace a resource, conditional on the version the caller observed
    ///
    /// The stored version must equal `resource.meta().resource_version`;
    /// on success the version is bumped and the updated resource
    /// returned. A mismatch fails the whole pass with `Conflict` so it
    /// restarts from a fresh read instead of losing a concurrent write.
    pub fn update(&self, mut resource: T) -> Result<T> {
        let key = resource.key();

        match self.items.entry(key.clone()) {
            Entry::Vacant(_) => Err(Error::not_found(T::KIND, key.to_string())),
            Entry::Occupied(mut slot) => {
                let stored_version = slot.get().meta().resource_version;
                if stored_version != resource.meta().resource_version {
                    return Err(Error::conflict(T::KIND, key.to_string()));
                }

                resource.meta_mut().resource_version = stored_version + 1;
                slot.insert(resource.clone());
                let _ = self.changes.send(key);
                Ok(resource)
            }
        }
    }

    /// Version-checked status write
    ///
    /// Same optimistic-concurrency contract as [`Collection::update`];
    /// named separately because status is the only part a reconciler is
    /// allowed to touch.
    pub fn update_status(&self, resource: T) -> Result<T> {
        self.update(resource)
    }

    /// Keys of every resource in the collection
    pub fn list_keys(&self) -> Vec<ResourceKey> {
        self.items.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Subscribe to the change feed of `(namespace, name)` keys
    pub fn subscribe(&self) -> broadcast::Receiver<ResourceKey> {
        self.changes.subscribe()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
