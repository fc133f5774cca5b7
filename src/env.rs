//! Gym-style environment over a compiled RDDL model.

use tracing::{debug, info, warn};

use crate::error::{RddlError, Result};
use crate::fluent::{ColumnIndex, DictSpace, FluentMap, FluentSpaceAdapter};
use crate::model::CompiledModel;

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// State fluents after the step.
    pub next_state: FluentMap,
    /// Scalar reward of the transition.
    pub reward: f32,
    /// Whether the horizon has been reached.
    pub done: bool,
    /// Intermediate fluent values computed during the step.
    pub info: FluentMap,
}

/// Transition engine wrapping a [`CompiledModel`].
///
/// Holds the current state and timestep and advances them one step at a
/// time by evaluating the model's CPFs and reward.
///
/// # Lifecycle
///
/// 1. Call [`RddlEnv::new`] with a compiled model.
/// 2. Call [`RddlEnv::reset`] to evaluate the initial state.
/// 3. Repeatedly call [`RddlEnv::step`] until `done`.
/// 4. Call [`RddlEnv::close`] to release the model's evaluation session.
#[derive(Debug)]
pub struct RddlEnv<M: CompiledModel> {
    model: M,
    observation_space: DictSpace,
    action_space: DictSpace,
    columns: ColumnIndex,
    state: Option<FluentMap>,
    timestep: Option<u32>,
    closed: bool,
}

impl<M: CompiledModel> RddlEnv<M> {
    /// Wraps `model`, deriving its observation and action spaces.
    ///
    /// Fails with [`RddlError::Configuration`] if the horizon is zero, the
    /// model declares no state or no action fluents, or a fluent's object
    /// names do not match its shape.
    pub fn new(model: M) -> Result<Self> {
        if model.horizon() == 0 {
            return Err(RddlError::Configuration(
                "horizon must be at least 1".into(),
            ));
        }
        let adapter = FluentSpaceAdapter::new(&model);
        let observation_space = adapter.describe_observations()?;
        let action_space = adapter.describe_actions()?;
        let columns = adapter.columns()?;
        Ok(Self {
            model,
            observation_space,
            action_space,
            columns,
            state: None,
            timestep: None,
            closed: false,
        })
    }

    pub fn horizon(&self) -> u32 {
        self.model.horizon()
    }

    pub fn observation_space(&self) -> &DictSpace {
        &self.observation_space
    }

    pub fn action_space(&self) -> &DictSpace {
        &self.action_space
    }

    /// Fluent-to-column mapping for tabular trajectory export.
    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    /// Current state, or `None` before the first reset.
    pub fn state(&self) -> Option<&FluentMap> {
        self.state.as_ref()
    }

    /// Current timestep, or `None` before the first reset.
    pub fn timestep(&self) -> Option<u32> {
        self.timestep
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Resets the timestep to 0 and the state to the model's initial state.
    pub fn reset(&mut self) -> Result<(FluentMap, u32)> {
        self.ensure_open()?;
        let initial = self
            .model
            .initial_state()?
            .ordered(self.model.state_fluents())?;
        initial.conform(self.model.state_fluents())?;

        self.state = Some(initial.clone());
        self.timestep = Some(0);
        info!(horizon = self.horizon(), "environment reset");
        Ok((initial, 0))
    }

    /// Executes `action` in the current state.
    ///
    /// Every declared action fluent must be present with its declared shape.
    /// On success the current state becomes `next_state` and the timestep
    /// advances by one. If the model fails to evaluate, the engine returns
    /// to its uninitialized state and must be reset.
    pub fn step(&mut self, action: &FluentMap) -> Result<StepResult> {
        self.ensure_open()?;
        let (state, timestep) = match (&self.state, self.timestep) {
            (Some(state), Some(timestep)) => (state, timestep),
            _ => return Err(RddlError::NotReset),
        };
        action.conform(self.model.action_fluents())?;

        let action = action.ordered(self.model.action_fluents())?;
        let state_batch = state.batched();
        let action_batch = action.batched();

        let outcome = evaluate(&mut self.model, &state_batch, &action_batch);
        let (info, next_state, reward) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(timestep, error = %e, "model evaluation failed");
                self.state = None;
                self.timestep = None;
                return Err(e);
            }
        };

        let timestep = timestep + 1;
        let done = timestep == self.horizon();
        debug!(timestep, reward, done, "environment step");

        self.state = Some(next_state.clone());
        self.timestep = Some(timestep);

        Ok(StepResult {
            next_state,
            reward,
            done,
            info,
        })
    }

    /// Releases the model's evaluation session.
    ///
    /// Calling `close` more than once is a no-op. After closing, `reset` and
    /// `step` fail with [`RddlError::ResourceClosed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.state = None;
        self.timestep = None;
        info!("environment closed");
        self.model.close()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RddlError::ResourceClosed)
        } else {
            Ok(())
        }
    }
}

/// Runs one batched evaluation and strips the batch axis from its outputs.
fn evaluate<M: CompiledModel>(
    model: &mut M,
    state: &FluentMap,
    action: &FluentMap,
) -> Result<(FluentMap, FluentMap, f32)> {
    let (interms, next_state) = model.cpfs(state, action)?;
    let reward = model.reward(state, action, &next_state)?;

    let info = interms.unbatch(0)?.ordered(model.interm_fluents())?;
    let next_state = next_state.unbatch(0)?.ordered(model.state_fluents())?;
    next_state.conform(model.state_fluents())?;

    let reward = reward
        .iter()
        .next()
        .copied()
        .ok_or_else(|| RddlError::Model("reward evaluated to an empty array".into()))?;

    Ok((info, next_state, reward))
}
