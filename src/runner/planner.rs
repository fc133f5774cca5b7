//! Decision-making collaborators driven by the runner.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::fluent::{DictSpace, FluentMap};

/// Chooses an action for each state.
///
/// `build` and `close` bracket the planner's lifetime inside a runner and
/// default to no-ops, so the runner always calls them.
///
/// Any `FnMut(&FluentMap, u32) -> Result<FluentMap>` closure is a planner.
pub trait Planner {
    /// Prepares internal resources before the first run.
    fn build(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the action to execute in `state` at `timestep`.
    fn select_action(&mut self, state: &FluentMap, timestep: u32) -> Result<FluentMap>;

    /// Releases internal resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns a human-readable name for this planner.
    fn name(&self) -> &str {
        "planner"
    }
}

impl<F> Planner for F
where
    F: FnMut(&FluentMap, u32) -> Result<FluentMap>,
{
    fn select_action(&mut self, state: &FluentMap, timestep: u32) -> Result<FluentMap> {
        self(state, timestep)
    }
}

/// Samples every action uniformly from the action space.
///
/// Unbounded action fluents are drawn from a standard normal. Used for
/// smoke tests and as a baseline.
pub struct RandomPlanner {
    space: DictSpace,
    rng: StdRng,
}

impl RandomPlanner {
    /// Creates a seeded random planner over `space`.
    pub fn new(space: DictSpace, seed: u64) -> Self {
        Self {
            space,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Planner for RandomPlanner {
    fn select_action(&mut self, _state: &FluentMap, _timestep: u32) -> Result<FluentMap> {
        Ok(self.space.sample(&mut self.rng))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Executes the same action at every timestep.
#[derive(Debug, Clone)]
pub struct ConstantPlanner {
    action: FluentMap,
}

impl ConstantPlanner {
    pub fn new(action: FluentMap) -> Self {
        Self { action }
    }

    /// A planner that always picks the all-zero action of `space`.
    pub fn zeros(space: &DictSpace) -> Self {
        Self::new(space.zeros())
    }
}

impl Planner for ConstantPlanner {
    fn select_action(&mut self, _state: &FluentMap, _timestep: u32) -> Result<FluentMap> {
        Ok(self.action.clone())
    }

    fn name(&self) -> &str {
        "constant"
    }
}
