//! Table maps and relation loading for the in-memory store.
//!
//! Records are kept detached (foreign keys only), one `BTreeMap` per table so
//! scans come back ordered by id. Relation paths are loaded by walking one
//! segment at a time: a foreign key relation is looked up by id, an inverse
//! relation by scanning the target table for a record pointing back.

use hashbrown::HashMap;
use std::any::Any;
use std::collections::BTreeMap;
use tally_core::{Error, FindOptions, Join, Model, Relation, RelationMut, Result, Where};

/// Type-erased detached record.
type AnyRecord = Box<dyn Any + Send + Sync>;

/// All tables of a store.
#[derive(Default)]
pub(crate) struct Tables {
    tables: HashMap<&'static str, BTreeMap<String, AnyRecord>>,
}

impl Tables {
    /// Iterates over the records of one table in id order.
    pub fn rows<M: Model>(&self) -> impl Iterator<Item = &M> + '_ {
        self.tables
            .get(M::TABLE)
            .into_iter()
            .flat_map(|table| table.values())
            .filter_map(|record| record.downcast_ref::<M>())
    }

    /// Gets a record by id.
    pub fn get<M: Model>(&self, id: &str) -> Option<&M> {
        self.tables
            .get(M::TABLE)
            .and_then(|table| table.get(id))
            .and_then(|record| record.downcast_ref::<M>())
    }

    /// Inserts or replaces a record, keeping only what is persisted.
    pub fn upsert<M: Model>(&mut self, record: &M) {
        self.tables
            .entry(M::TABLE)
            .or_default()
            .insert(record.id().to_string(), Box::new(record.detached()));
    }

    /// Deletes a record by id. Returns true if it existed.
    pub fn delete<M: Model>(&mut self, id: &str) -> bool {
        self.tables
            .get_mut(M::TABLE)
            .map(|table| table.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Returns the number of records in a table.
    pub fn len<M: Model>(&self) -> usize {
        self.tables.get(M::TABLE).map(|table| table.len()).unwrap_or(0)
    }

    /// Selects records matching the options, loading requested relations.
    pub fn select<M: Model>(&self, options: &FindOptions, limit: Option<usize>) -> Result<Vec<M>> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut records: Vec<M> = match options.filter.pinned_id() {
            Some(id) => self
                .get::<M>(id)
                .filter(|record| options.filter.matches(*record))
                .cloned()
                .into_iter()
                .collect(),
            None => self
                .rows::<M>()
                .filter(|record| options.filter.matches(*record))
                .take(limit)
                .cloned()
                .collect(),
        };
        records.truncate(limit);

        for record in &mut records {
            for path in &options.relations {
                let segments: Vec<&str> = path.split('.').collect();
                self.load_path(record, &segments, path)?;
            }
        }
        Ok(records)
    }

    fn load_path<M: Model>(&self, record: &mut M, segments: &[&str], path: &str) -> Result<()> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        let parent_id = record.id().to_string();
        let relation = record
            .relation_mut(head)
            .ok_or_else(|| Error::unknown_relation(M::TABLE, path))?;

        match relation {
            RelationMut::Video(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::Channel(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::ChannelCategory(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::VideoCategory(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::StorageDataObject(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::Membership(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
            RelationMut::CuratorGroup(target, join) => {
                self.load_into(target, join, &parent_id, rest, path)
            }
        }
    }

    fn load_into<T: Model>(
        &self,
        relation: &mut Relation<T>,
        join: Join,
        parent_id: &str,
        rest: &[&str],
        path: &str,
    ) -> Result<()> {
        if !relation.is_loaded() {
            let found = match join {
                Join::ForeignKey => relation.id().and_then(|id| self.get::<T>(id)).cloned(),
                Join::Inverse(field) => self
                    .rows::<T>()
                    .find(|candidate| Where::new().eq(field, parent_id).matches(*candidate))
                    .cloned(),
            };
            match (found, join) {
                (Some(target), _) => *relation = Relation::with(target),
                // dangling foreign keys stay as they are
                (None, Join::ForeignKey) => {}
                (None, Join::Inverse(_)) => *relation = Relation::Unset,
            }
        }

        if let Some(target) = relation.get_mut() {
            self.load_path(target, rest, path)?;
        }
        Ok(())
    }
}
