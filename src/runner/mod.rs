//! Planner/environment interaction loop.
//!
//! A [`Runner`] owns an environment and a [`Planner`], resets the
//! environment, asks the planner for an action at every timestep, and
//! records each transition in a fresh [`Trajectory`] until the horizon is
//! reached. [`RunObserver`]s and an optional [`Renderer`] see every step.

pub mod observer;
pub mod planner;
pub mod summary;


pub use observer::{Renderer, RunObserver, StepRecord, TracingObserver};
pub use planner::{ConstantPlanner, Planner, RandomPlanner};
pub use summary::RunSummary;

use std::time::{Duration, Instant};

use tracing::{debug, info, info_span};

use crate::config::RunnerConfig;
use crate::env::RddlEnv;
use crate::error::{RddlError, Result};
use crate::model::CompiledModel;
use crate::trajectory::{Transition, Trajectory};

use observer::format_values;

/// Drives a [`Planner`] against an [`RddlEnv`].
///
/// # Lifecycle
///
/// 1. Create with [`Runner::new`], optionally attach observers and a renderer.
/// 2. Call [`Runner::build`] once to let the planner prepare.
/// 3. Call [`Runner::run`] (or [`Runner::evaluate`]) any number of times.
/// 4. Call [`Runner::close`] to release the planner and the environment.
pub struct Runner<M: CompiledModel, P: Planner> {
    env: RddlEnv<M>,
    planner: P,
    config: RunnerConfig,
    observers: Vec<Box<dyn RunObserver>>,
    renderer: Option<Box<dyn Renderer>>,
    closed: bool,
}

impl<M: CompiledModel, P: Planner> Runner<M, P> {
    pub fn new(env: RddlEnv<M>, planner: P) -> Self {
        Self {
            env,
            planner,
            config: RunnerConfig::default(),
            observers: Vec::new(),
            renderer: None,
            closed: false,
        }
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an observer; observers are notified in insertion order.
    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Sets the render hook, used when `config.render` is enabled.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn env(&self) -> &RddlEnv<M> {
        &self.env
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Lets the planner prepare its resources.
    pub fn build(&mut self) -> Result<()> {
        self.ensure_open()?;
        debug!(planner = self.planner.name(), "building planner");
        self.planner.build()
    }

    /// Runs one episode from `reset` until `done`.
    ///
    /// Returns the recorded trajectory and the wall-clock time of the run.
    /// Any planner, environment, or render failure aborts the run.
    pub fn run(&mut self) -> Result<(Trajectory, Duration)> {
        self.ensure_open()?;
        let start = Instant::now();
        let mut trajectory = Trajectory::new();
        let span = info_span!("run", run_id = %trajectory.id(), planner = self.planner.name());
        let _enter = span.enter();

        for observer in &mut self.observers {
            observer.on_run_start();
        }

        let (mut state, mut timestep) = self.env.reset()?;
        let mut total_reward = 0.0f32;

        loop {
            let action = self.planner.select_action(&state, timestep)?;
            let result = self.env.step(&action)?;
            total_reward += result.reward;

            let transition = Transition {
                step: timestep,
                state,
                action,
                reward: result.reward,
                next_state: result.next_state,
                info: result.info,
                done: result.done,
            };

            if self.config.render {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.render(&transition.next_state, timestep + 1)?;
                }
            }

            if self.config.debug {
                debug_transition(&transition);
            }

            let record = StepRecord {
                timestep,
                state: &transition.state,
                action: &transition.action,
                reward: transition.reward,
                next_state: &transition.next_state,
                done: transition.done,
                info: &transition.info,
                total_reward,
            };
            for observer in &mut self.observers {
                observer.on_step(&record);
            }

            let done = transition.done;
            state = transition.next_state.clone();
            timestep += 1;
            trajectory.push(transition);

            if done {
                break;
            }
        }

        let elapsed = start.elapsed();
        info!(
            steps = trajectory.len(),
            total_reward,
            elapsed = ?elapsed,
            "run complete"
        );

        for observer in &mut self.observers {
            observer.on_run_end(&trajectory, elapsed);
        }

        Ok((trajectory, elapsed))
    }

    /// Runs `n_runs` episodes and summarizes their total rewards.
    pub fn evaluate(&mut self, n_runs: usize) -> Result<RunSummary> {
        if n_runs == 0 {
            return Err(RddlError::Configuration(
                "evaluate needs at least one run".into(),
            ));
        }
        let mut runs = Vec::with_capacity(n_runs);
        for _ in 0..n_runs {
            let (trajectory, elapsed) = self.run()?;
            runs.push((trajectory.total_reward(), elapsed));
        }
        RunSummary::from_runs(&runs)
    }

    /// Closes the planner and the environment.
    ///
    /// Both are closed even if the first fails; the first error is returned.
    /// Subsequent calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let planner = self.planner.close();
        let env = self.env.close();
        planner.and(env)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(RddlError::ResourceClosed)
        } else {
            Ok(())
        }
    }
}

fn debug_transition(transition: &Transition) {
    debug!(timestep = transition.step, "::: transition :::");
    for (role, fluents) in [
        ("state", &transition.state),
        ("action", &transition.action),
        ("next_state", &transition.next_state),
        ("info", &transition.info),
    ] {
        for (name, value) in fluents.iter() {
            debug!("{} {} = {}", role, name, format_values(value.iter()));
        }
    }
    debug!(
        reward = transition.reward,
        terminal = transition.done,
        "transition outcome"
    );
}
