//! Query descriptors passed to a `Store`.
//!
//! `FindOptions` pairs a `Where` filter (a conjunction of field equalities)
//! with the relation paths a store must load on every returned record.

use crate::model::Model;
use crate::value::Value;

/// Conjunction of field equality conditions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Where {
    conditions: Vec<(String, Value)>,
}

impl Where {
    /// Creates an empty filter that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter matching a single id.
    pub fn id(id: impl Into<String>) -> Self {
        Self::new().eq("id", Value::String(id.into()))
    }

    /// Adds an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Returns the id this filter is pinned to, if it has an `id` condition.
    pub fn pinned_id(&self) -> Option<&str> {
        self.conditions
            .iter()
            .find(|(field, _)| field == "id")
            .and_then(|(_, value)| value.as_str())
    }

    /// Returns true if the record satisfies every condition.
    ///
    /// A condition on a field the record does not expose never matches.
    pub fn matches<M: Model>(&self, record: &M) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| record.field(field).as_ref() == Some(value))
    }
}

/// Options for `Store::get` and `Store::get_many`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    /// Filter records must satisfy.
    pub filter: Where,
    /// Dot-separated relation paths to load, e.g. `channel.category`.
    pub relations: Vec<String>,
}

impl FindOptions {
    /// Creates options for the given filter without relations.
    pub fn new(filter: Where) -> Self {
        Self {
            filter,
            relations: Vec::new(),
        }
    }

    /// Creates options matching a single id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new(Where::id(id))
    }

    /// Adds relation paths to load.
    pub fn with_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
        self
    }
}
