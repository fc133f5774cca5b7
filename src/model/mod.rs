//! The compiled-model contract consumed by the environment.
//!
//! Parsing RDDL and building its numeric dataflow graph happen outside this
//! crate. A compiler hands back something implementing [`CompiledModel`]:
//! fluent metadata, the instance horizon, and batched evaluation entry
//! points for the CPFs and the reward.

pub mod fn_model;

pub use fn_model::{FnModel, FnModelBuilder};

use ndarray::ArrayD;

use crate::error::Result;
use crate::fluent::{FluentDescriptor, FluentMap};

/// An evaluator for one RDDL domain instance.
///
/// `cpfs` and `reward` receive batched maps: every array carries a leading
/// batch axis. Both are pure functions of their inputs.
pub trait CompiledModel {
    /// Number of timesteps in one episode.
    fn horizon(&self) -> u32;

    /// State fluents in declaration order.
    fn state_fluents(&self) -> &[FluentDescriptor];

    /// Action fluents in declaration order.
    fn action_fluents(&self) -> &[FluentDescriptor];

    /// Intermediate fluents in declaration order.
    fn interm_fluents(&self) -> &[FluentDescriptor];

    /// Evaluates the instance's initial state (unbatched).
    fn initial_state(&mut self) -> Result<FluentMap>;

    /// Evaluates `(intermediate fluents, next-state fluents)`.
    fn cpfs(&mut self, state: &FluentMap, action: &FluentMap) -> Result<(FluentMap, FluentMap)>;

    /// Evaluates the batched reward.
    fn reward(
        &mut self,
        state: &FluentMap,
        action: &FluentMap,
        next_state: &FluentMap,
    ) -> Result<ArrayD<f32>>;

    /// Releases the evaluation session.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<M: CompiledModel + ?Sized> CompiledModel for Box<M> {
    fn horizon(&self) -> u32 {
        (**self).horizon()
    }

    fn state_fluents(&self) -> &[FluentDescriptor] {
        (**self).state_fluents()
    }

    fn action_fluents(&self) -> &[FluentDescriptor] {
        (**self).action_fluents()
    }

    fn interm_fluents(&self) -> &[FluentDescriptor] {
        (**self).interm_fluents()
    }

    fn initial_state(&mut self) -> Result<FluentMap> {
        (**self).initial_state()
    }

    fn cpfs(&mut self, state: &FluentMap, action: &FluentMap) -> Result<(FluentMap, FluentMap)> {
        (**self).cpfs(state, action)
    }

    fn reward(
        &mut self,
        state: &FluentMap,
        action: &FluentMap,
        next_state: &FluentMap,
    ) -> Result<ArrayD<f32>> {
        (**self).reward(state, action, next_state)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Turns RDDL source text into a [`CompiledModel`].
pub trait ModelCompiler {
    type Model: CompiledModel;

    fn compile(&self, rddl: &str) -> Result<Self::Model>;
}
