//! Executors apply reported deltas to derived aggregates.
//!
//! An executor resolves the aggregates a snapshot references, applies the
//! old-side or new-side delta to each, and persists them. `Propagate` is the
//! type-erased form the manager stores, so executors with different aggregate
//! types can be registered for the same listener.

use crate::delta::Delta;
use async_trait::async_trait;
use futures::future::try_join_all;
use tally_core::{Aggregate, FindOptions, Model, Result, Store};
use tracing::{trace, warn};

/// An aggregate paired with whether it already exists in storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Derived<D> {
    pub entity: D,
    pub persisted: bool,
}

impl<D> Derived<D> {
    /// Wraps an aggregate that is not in storage yet.
    pub fn new(entity: D) -> Self {
        Self {
            entity,
            persisted: false,
        }
    }

    /// Wraps an aggregate loaded from storage.
    pub fn persisted(entity: D) -> Self {
        Self {
            entity,
            persisted: true,
        }
    }

    /// Maps the aggregate, keeping the persisted flag.
    pub fn map<U>(self, f: impl FnOnce(D) -> U) -> Derived<U> {
        Derived {
            entity: f(self.entity),
            persisted: self.persisted,
        }
    }
}

/// Which snapshot a delta belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

/// Applies deltas of one listener to one kind of aggregate.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Tracked entity the listener observes.
    type Entity: Model;
    /// Aggregate type holding the derived counter.
    type Derived: Send + Sync;

    /// Resolves the aggregates referenced by a snapshot.
    ///
    /// Returns an empty list when the relations naming them are not loaded.
    async fn load_derived_entities<S: Store>(
        &self,
        store: &S,
        entity: &Self::Entity,
    ) -> Result<Vec<Derived<Self::Derived>>>;

    /// Returns true if the delta applies to this aggregate.
    fn is_affected(&self, _derived: &Self::Derived, _change: &Delta) -> bool {
        true
    }

    /// Applies the delta reported for the old snapshot.
    fn update_old_value(&self, derived: Self::Derived, change: &Delta) -> Self::Derived;

    /// Applies the delta reported for the new snapshot.
    fn update_new_value(&self, derived: Self::Derived, change: &Delta) -> Self::Derived;

    /// Persists every updated aggregate.
    async fn save_derived_entities<S: Store>(
        &self,
        store: &S,
        derived: Vec<Derived<Self::Derived>>,
    ) -> Result<()>;
}

/// Type-erased executor for tracked entity `E` over store `S`.
#[async_trait]
pub trait Propagate<E: Model, S: Store>: Send + Sync {
    /// Loads the aggregates of `entity`, applies `change` and saves them.
    async fn propagate(&self, store: &S, entity: &E, side: Side, change: &Delta) -> Result<()>;
}

#[async_trait]
impl<S, X> Propagate<X::Entity, S> for X
where
    S: Store,
    X: Executor,
{
    async fn propagate(
        &self,
        store: &S,
        entity: &X::Entity,
        side: Side,
        change: &Delta,
    ) -> Result<()> {
        let derived = self.load_derived_entities(store, entity).await?;
        let updated: Vec<_> = derived
            .into_iter()
            .filter(|derived| self.is_affected(&derived.entity, change))
            .map(|derived| {
                derived.map(|entity| match side {
                    Side::Old => self.update_old_value(entity, change),
                    Side::New => self.update_new_value(entity, change),
                })
            })
            .collect();

        if updated.is_empty() {
            trace!(
                table = <X::Entity as Model>::TABLE,
                id = entity.id(),
                ?side,
                "no derived entity affected"
            );
            return Ok(());
        }
        self.save_derived_entities(store, updated).await
    }
}

/// Re-reads an aggregate by id so a stale copy carried by a snapshot is never written back.
///
/// Falls back to the carried copy when the aggregate is not persisted yet, and
/// returns `None` when neither exists.
pub async fn resolve<S: Store, M: Aggregate>(
    store: &S,
    id: &str,
    carried: Option<&M>,
) -> Result<Option<Derived<M>>> {
    if let Some(entity) = store.get::<M>(FindOptions::by_id(id)).await? {
        return Ok(Some(Derived::persisted(entity)));
    }
    match carried {
        Some(entity) => Ok(Some(Derived::new(entity.clone()))),
        None => {
            warn!(table = M::TABLE, id, "derived entity not found, skipping");
            Ok(None)
        }
    }
}

/// Writes an aggregate according to its existence policy.
///
/// Saves it if it should persist, removes it if it should not but existed, and
/// does nothing otherwise.
pub async fn persist<S: Store, M: Aggregate>(store: &S, derived: &Derived<M>) -> Result<()> {
    persist_record(store, &derived.entity, derived.persisted).await
}

/// Same as [`persist`] for an aggregate borrowed out of a wider derived value.
pub async fn persist_record<S: Store, M: Aggregate>(
    store: &S,
    entity: &M,
    persisted: bool,
) -> Result<()> {
    trace!(
        table = M::TABLE,
        id = entity.id(),
        counter = entity.counter(),
        "persisting derived entity"
    );
    if entity.should_persist() {
        store.save(entity).await
    } else if persisted {
        store.remove(entity).await
    } else {
        Ok(())
    }
}

/// Persists a batch of aggregates of one type concurrently.
pub async fn persist_all<S: Store, M: Aggregate>(store: &S, derived: &[Derived<M>]) -> Result<()> {
    try_join_all(derived.iter().map(|derived| persist(store, derived))).await?;
    Ok(())
}
