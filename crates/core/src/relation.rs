//! Relations between records.
//!
//! A `Relation<T>` is the field type a record uses to point at another record.
//! It is either unset, a bare foreign key, or the loaded target record. Stores
//! persist foreign keys only and load targets on request through relation
//! paths.

use crate::model::Model;

/// A reference from one record to another.
#[derive(Clone, Debug, PartialEq)]
pub enum Relation<T> {
    /// No related record (or the inverse side of a relation that was not loaded).
    Unset,
    /// Foreign key of a related record that was not loaded.
    Ref(String),
    /// The loaded related record.
    Loaded(Box<T>),
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Relation::Unset
    }
}

impl<T> Relation<T> {
    /// Creates an unloaded reference to the record with the given id.
    pub fn reference(id: impl Into<String>) -> Self {
        Relation::Ref(id.into())
    }

    /// Creates a loaded relation.
    pub fn with(record: T) -> Self {
        Relation::Loaded(Box::new(record))
    }

    /// Returns the loaded record, if any.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        match self {
            Relation::Loaded(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the loaded record mutably, if any.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Relation::Loaded(record) => Some(record),
            _ => None,
        }
    }

    /// Returns true if the related record is loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Relation::Loaded(_))
    }

    /// Returns true if there is no related record.
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Relation::Unset)
    }
}

impl<T: Model> Relation<T> {
    /// Returns the id of the related record, loaded or not.
    pub fn id(&self) -> Option<&str> {
        match self {
            Relation::Unset => None,
            Relation::Ref(id) => Some(id),
            Relation::Loaded(record) => Some(record.id()),
        }
    }

    /// Reduces a loaded relation to its foreign key.
    pub fn detach(&self) -> Self {
        match self.id() {
            Some(id) => Relation::Ref(id.into()),
            None => Relation::Unset,
        }
    }
}

impl<T: Model> From<T> for Relation<T> {
    fn from(record: T) -> Self {
        Relation::with(record)
    }
}
