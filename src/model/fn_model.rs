//! A [`CompiledModel`] backed by plain Rust closures.

use std::fmt;

use ndarray::{ArrayD, IxDyn};

use super::CompiledModel;
use crate::error::{RddlError, Result};
use crate::fluent::{FluentDescriptor, FluentMap};

type CpfFn = Box<dyn FnMut(&FluentMap, &FluentMap) -> Result<(FluentMap, FluentMap)>>;
type RewardFn = Box<dyn FnMut(&FluentMap, &FluentMap, &FluentMap) -> Result<f32>>;

/// Compiled model whose CPFs and reward are closures over single
/// (unbatched) states.
///
/// Batched calls are evaluated entry by entry and restacked, so the closures
/// never see the batch axis. Build one with [`FnModelBuilder`].
pub struct FnModel {
    horizon: u32,
    state_fluents: Vec<FluentDescriptor>,
    action_fluents: Vec<FluentDescriptor>,
    interm_fluents: Vec<FluentDescriptor>,
    initial_state: FluentMap,
    cpfs: CpfFn,
    reward: RewardFn,
    closed: bool,
}

impl FnModel {
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RddlError::ResourceClosed)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for FnModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel")
            .field("horizon", &self.horizon)
            .field("state_fluents", &self.state_fluents)
            .field("action_fluents", &self.action_fluents)
            .field("interm_fluents", &self.interm_fluents)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl CompiledModel for FnModel {
    fn horizon(&self) -> u32 {
        self.horizon
    }

    fn state_fluents(&self) -> &[FluentDescriptor] {
        &self.state_fluents
    }

    fn action_fluents(&self) -> &[FluentDescriptor] {
        &self.action_fluents
    }

    fn interm_fluents(&self) -> &[FluentDescriptor] {
        &self.interm_fluents
    }

    fn initial_state(&mut self) -> Result<FluentMap> {
        self.ensure_open()?;
        Ok(self.initial_state.clone())
    }

    fn cpfs(&mut self, state: &FluentMap, action: &FluentMap) -> Result<(FluentMap, FluentMap)> {
        self.ensure_open()?;
        let batch = state.batch_size()?;
        let mut interms = Vec::with_capacity(batch);
        let mut next_states = Vec::with_capacity(batch);
        for b in 0..batch {
            let (interm, next_state) = (self.cpfs)(&state.unbatch(b)?, &action.unbatch(b)?)?;
            interms.push(interm);
            next_states.push(next_state);
        }
        Ok((
            FluentMap::stack(&interms, &self.interm_fluents)?,
            FluentMap::stack(&next_states, &self.state_fluents)?,
        ))
    }

    fn reward(
        &mut self,
        state: &FluentMap,
        action: &FluentMap,
        next_state: &FluentMap,
    ) -> Result<ArrayD<f32>> {
        self.ensure_open()?;
        let batch = state.batch_size()?;
        let rewards = (0..batch)
            .map(|b| {
                (self.reward)(
                    &state.unbatch(b)?,
                    &action.unbatch(b)?,
                    &next_state.unbatch(b)?,
                )
            })
            .collect::<Result<Vec<f32>>>()?;
        ArrayD::from_shape_vec(IxDyn(&[batch]), rewards)
            .map_err(|e| RddlError::Model(e.to_string()))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Builder for [`FnModel`].
///
/// ```ignore
/// let model = FnModelBuilder::new(10)
///     .state(FluentDescriptor::scalar("x/0"), arr0(0.0).into_dyn())
///     .action(FluentDescriptor::scalar("a/0"))
///     .cpfs(|s, a| { /* ... */ })
///     .reward(|_, _, next| Ok(-next["x/0"].sum()))
///     .build()?;
/// ```
pub struct FnModelBuilder {
    horizon: u32,
    state_fluents: Vec<FluentDescriptor>,
    action_fluents: Vec<FluentDescriptor>,
    interm_fluents: Vec<FluentDescriptor>,
    initial_state: FluentMap,
    cpfs: Option<CpfFn>,
    reward: Option<RewardFn>,
}

impl FnModelBuilder {
    pub fn new(horizon: u32) -> Self {
        Self {
            horizon,
            state_fluents: Vec::new(),
            action_fluents: Vec::new(),
            interm_fluents: Vec::new(),
            initial_state: FluentMap::new(),
            cpfs: None,
            reward: None,
        }
    }

    /// Declares a state fluent with its initial value.
    pub fn state(mut self, fluent: FluentDescriptor, initial: ArrayD<f32>) -> Self {
        self.initial_state.insert(fluent.name.clone(), initial);
        self.state_fluents.push(fluent);
        self
    }

    pub fn action(mut self, fluent: FluentDescriptor) -> Self {
        self.action_fluents.push(fluent);
        self
    }

    pub fn interm(mut self, fluent: FluentDescriptor) -> Self {
        self.interm_fluents.push(fluent);
        self
    }

    /// Sets the transition function returning `(interms, next_state)`.
    pub fn cpfs<F>(mut self, f: F) -> Self
    where
        F: FnMut(&FluentMap, &FluentMap) -> Result<(FluentMap, FluentMap)> + 'static,
    {
        self.cpfs = Some(Box::new(f));
        self
    }

    /// Sets the reward function of `(state, action, next_state)`.
    pub fn reward<F>(mut self, f: F) -> Self
    where
        F: FnMut(&FluentMap, &FluentMap, &FluentMap) -> Result<f32> + 'static,
    {
        self.reward = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<FnModel> {
        if self.horizon == 0 {
            return Err(RddlError::Configuration("horizon must be positive".into()));
        }
        if self.state_fluents.is_empty() {
            return Err(RddlError::Configuration(
                "model declares no state fluents".into(),
            ));
        }
        self.initial_state.conform(&self.state_fluents)?;
        let cpfs = self
            .cpfs
            .ok_or_else(|| RddlError::Configuration("missing cpfs function".into()))?;
        let reward = self
            .reward
            .ok_or_else(|| RddlError::Configuration("missing reward function".into()))?;

        Ok(FnModel {
            horizon: self.horizon,
            state_fluents: self.state_fluents,
            action_fluents: self.action_fluents,
            interm_fluents: self.interm_fluents,
            initial_state: self.initial_state,
            cpfs,
            reward,
            closed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{scalar, scenario_model};
    use ndarray::arr0;

    fn batched_inputs() -> (FluentMap, FluentMap) {
        let state: FluentMap = [("x/0", scalar(1.0)), ("y/0", scalar(2.0))]
            .into_iter()
            .collect();
        let action: FluentMap = [("a/0", scalar(0.5))].into_iter().collect();
        (state.batched(), action.batched())
    }

    #[test]
    fn cpfs_keep_batch_axis() {
        let mut model = scenario_model(5);
        let (state, action) = batched_inputs();
        let (interms, next_state) = model.cpfs(&state, &action).unwrap();
        assert_eq!(interms["d/0"].shape(), &[1]);
        assert_eq!(next_state["x/0"].shape(), &[1]);
        assert_eq!(next_state.names().collect::<Vec<_>>(), vec!["x/0", "y/0"]);
    }

    #[test]
    fn reward_is_batched() {
        let mut model = scenario_model(5);
        let (state, action) = batched_inputs();
        let (_, next_state) = model.cpfs(&state, &action).unwrap();
        let reward = model.reward(&state, &action, &next_state).unwrap();
        assert_eq!(reward.shape(), &[1]);
    }

    #[test]
    fn closed_model_rejects_evaluation() {
        let mut model = scenario_model(5);
        model.close().unwrap();
        assert!(model.is_closed());
        assert!(matches!(
            model.initial_state(),
            Err(RddlError::ResourceClosed)
        ));
    }

    #[test]
    fn build_requires_functions() {
        let result = FnModelBuilder::new(3)
            .state(FluentDescriptor::scalar("x/0"), arr0(0.0).into_dyn())
            .build();
        assert!(matches!(result, Err(RddlError::Configuration(_))));
    }

    #[test]
    fn build_rejects_mismatched_initial_state() {
        let result = FnModelBuilder::new(3)
            .state(
                FluentDescriptor::new("p/1", vec![2], crate::fluent::FluentKind::Real),
                arr0(0.0).into_dyn(),
            )
            .cpfs(|s, _| Ok((FluentMap::new(), s.clone())))
            .reward(|_, _, _| Ok(0.0))
            .build();
        assert!(matches!(result, Err(RddlError::ShapeMismatch { .. })));
    }
}
