//! Derives the observation/action contract from compiled-model metadata.

use super::columns::ColumnIndex;
use super::descriptor::FluentDescriptor;
use super::space::{ArraySpace, DictSpace};
use crate::error::{RddlError, Result};
use crate::model::CompiledModel;

/// Translates a model's fluent declarations into [`DictSpace`]s.
///
/// Every declared fluent becomes an unbounded [`ArraySpace`] of its shape.
/// The adapter only reads metadata; it never evaluates the model.
pub struct FluentSpaceAdapter<'a, M: CompiledModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: CompiledModel + ?Sized> FluentSpaceAdapter<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// One space per state fluent.
    pub fn describe_observations(&self) -> Result<DictSpace> {
        describe(self.model.state_fluents(), "state")
    }

    /// One space per action fluent.
    pub fn describe_actions(&self) -> Result<DictSpace> {
        describe(self.model.action_fluents(), "action")
    }

    /// Column names for every state, action, and intermediate fluent, in
    /// that order.
    ///
    /// Fails with [`RddlError::Configuration`] if a descriptor's object
    /// names do not match its shape.
    pub fn columns(&self) -> Result<ColumnIndex> {
        ColumnIndex::from_descriptors(
            self.model
                .state_fluents()
                .iter()
                .chain(self.model.action_fluents())
                .chain(self.model.interm_fluents()),
        )
    }
}

fn describe(fluents: &[FluentDescriptor], role: &str) -> Result<DictSpace> {
    if fluents.is_empty() {
        return Err(RddlError::Configuration(format!(
            "domain declares no {} fluents",
            role
        )));
    }
    Ok(DictSpace::new(
        fluents
            .iter()
            .map(|f| (f.name.clone(), ArraySpace::unbounded(f.shape.clone())))
            .collect(),
    ))
}
