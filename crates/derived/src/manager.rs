//! Derived-properties manager.
//!
//! A `DerivedPropertiesManager` drives every listener registered for one
//! tracked entity type. The mapping layer calls one of the three lifecycle
//! methods for each creation, update or deletion, before persisting the
//! tracked entity itself; the manager then compares snapshots and lets the
//! executors update the derived aggregates.
//!
//! Calls are processed to completion one at a time; there is no queueing and
//! no retry. Any storage failure is returned to the caller.

use crate::executor::{Propagate, Side};
use crate::listener::Listener;
use std::sync::Arc;
use tally_core::{FindOptions, Model, Result, Store};
use tracing::{debug, trace};

struct Registration<E: Model, S: Store> {
    listener: Box<dyn Listener<E>>,
    executors: Vec<Box<dyn Propagate<E, S>>>,
}

/// Maintains derived counters affected by entities of type `E`.
pub struct DerivedPropertiesManager<E: Model, S: Store> {
    store: Arc<S>,
    relations: Vec<String>,
    registrations: Vec<Registration<E, S>>,
}

impl<E: Model, S: Store> DerivedPropertiesManager<E, S> {
    /// Creates a manager without default relations.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_relations(store, &[])
    }

    /// Creates a manager that always loads the given relations on fetched snapshots.
    pub fn with_relations(store: Arc<S>, relations: &[&str]) -> Self {
        let mut manager = Self {
            store,
            relations: Vec::new(),
            registrations: Vec::new(),
        };
        manager.extend_relations(relations);
        manager
    }

    /// Registers a listener with the executors applying its deltas.
    ///
    /// The listener's relation dependencies are added to the relations loaded
    /// on fetched snapshots.
    pub fn register_listener<L>(&mut self, listener: L, executors: Vec<Box<dyn Propagate<E, S>>>)
    where
        L: Listener<E> + 'static,
    {
        self.extend_relations(listener.relation_dependencies());
        self.registrations.push(Registration {
            listener: Box::new(listener),
            executors,
        });
    }

    fn extend_relations(&mut self, relations: &[&str]) {
        for relation in relations {
            if !self.relations.iter().any(|known| known == relation) {
                self.relations.push((*relation).to_string());
            }
        }
    }

    /// Relations loaded on fetched snapshots, in registration order.
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }

    /// Returns the store this manager reads and writes.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Handles the creation of `entity`.
    pub async fn on_main_entity_creation(&self, entity: &E) -> Result<()> {
        self.handle(None, Some(entity)).await
    }

    /// Handles an update of `entity`.
    ///
    /// Without `initial`, the persisted snapshot is fetched with every
    /// registered relation loaded, so this must run before the updated entity
    /// is saved. A missing snapshot is handled as a creation.
    pub async fn on_main_entity_update(&self, entity: &E, initial: Option<&E>) -> Result<()> {
        match initial {
            Some(initial) => self.handle(Some(initial), Some(entity)).await,
            None => {
                let fetched = self.fetch_snapshot(entity.id()).await?;
                self.handle(fetched.as_ref(), Some(entity)).await
            }
        }
    }

    /// Handles the deletion of `initial`.
    pub async fn on_main_entity_deletion(&self, initial: &E) -> Result<()> {
        self.handle(Some(initial), None).await
    }

    async fn fetch_snapshot(&self, id: &str) -> Result<Option<E>> {
        debug!(table = E::TABLE, id, relations = ?self.relations, "fetching snapshot");
        let options = FindOptions::by_id(id).with_relations(self.relations.iter().cloned());
        let snapshot = self.store.get::<E>(options).await?;
        if snapshot.is_none() {
            debug!(table = E::TABLE, id, "no persisted snapshot, handling update as creation");
        }
        Ok(snapshot)
    }

    async fn handle(&self, old: Option<&E>, new: Option<&E>) -> Result<()> {
        let store = self.store.as_ref();
        for registration in &self.registrations {
            let change = registration.listener.has_value_changed(old, new);
            let Some(change) = change.filter(|change| !change.is_empty()) else {
                trace!(table = E::TABLE, "no derived change");
                continue;
            };
            debug!(table = E::TABLE, ?change, "derived change detected");

            if let (Some(old), Some(delta)) = (old, change.old.as_ref()) {
                for executor in &registration.executors {
                    executor.propagate(store, old, Side::Old, delta).await?;
                }
            }
            if let (Some(new), Some(delta)) = (new, change.new.as_ref()) {
                for executor in &registration.executors {
                    executor.propagate(store, new, Side::New, delta).await?;
                }
            }
        }
        Ok(())
    }
}
