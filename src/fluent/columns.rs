//! Fluent-to-column naming used by tabular export.

use super::descriptor::FluentDescriptor;
use super::map::FluentMap;
use crate::error::{RddlError, Result};

/// Maps each fluent name to the flattened column names of its elements.
///
/// Fluents keep the order they were declared in, so the full column list
/// is known before any transition is recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIndex {
    columns: FluentMap<Vec<String>>,
}

impl ColumnIndex {
    /// Indexes `fluents` in iteration order.
    ///
    /// Fails with [`RddlError::Configuration`] if a descriptor's object
    /// names do not match its shape.
    pub fn from_descriptors<'a, I>(fluents: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a FluentDescriptor>,
    {
        let mut columns = FluentMap::new();
        for fluent in fluents {
            fluent.validate()?;
            columns.insert(fluent.name.clone(), fluent.element_names());
        }
        Ok(Self { columns })
    }

    pub fn get(&self, fluent: &str) -> Option<&[String]> {
        self.columns.get(fluent).map(Vec::as_slice)
    }

    /// Column names for `fluent`, or [`RddlError::UnknownFluent`].
    pub fn element_names(&self, fluent: &str) -> Result<&[String]> {
        self.get(fluent)
            .ok_or_else(|| RddlError::UnknownFluent(fluent.to_string()))
    }

    /// Indexed fluent names in declaration order.
    pub fn fluents(&self) -> impl Iterator<Item = &str> {
        self.columns.names()
    }

    /// Every column name, fluent by fluent.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.values().flatten().cloned().collect()
    }

    /// Number of indexed fluents.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
