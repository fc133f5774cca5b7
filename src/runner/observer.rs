//! Hooks invoked by the runner around and during a run.

use std::fmt::Write as _;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::Result;
use crate::fluent::FluentMap;
use crate::trajectory::Trajectory;

/// Everything known about one step, handed to [`RunObserver::on_step`].
///
/// `total_reward` is the running sum up to and including this step.
#[derive(Debug, Clone, Copy)]
pub struct StepRecord<'a> {
    pub timestep: u32,
    pub state: &'a FluentMap,
    pub action: &'a FluentMap,
    pub reward: f32,
    pub next_state: &'a FluentMap,
    pub done: bool,
    pub info: &'a FluentMap,
    pub total_reward: f32,
}

/// Observer of a run's lifecycle. All hooks default to no-ops.
pub trait RunObserver {
    fn on_run_start(&mut self) {}

    fn on_step(&mut self, _record: &StepRecord<'_>) {}

    fn on_run_end(&mut self, _trajectory: &Trajectory, _elapsed: Duration) {}
}

/// Render hook called after every step with the new state.
pub trait Renderer {
    fn render(&mut self, state: &FluentMap, timestep: u32) -> Result<()>;
}

/// Logs every transition and the run summary through `tracing`.
///
/// Step headers go out at `info`, fluent values at `debug`. Install a
/// subscriber writing to a file (see [`crate::logging::init_logging`]) to
/// get a per-run transition log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_run_start(&mut self) {
        info!("run started");
    }

    fn on_step(&mut self, record: &StepRecord<'_>) {
        info!(
            timestep = record.timestep,
            reward = record.reward,
            total_reward = record.total_reward,
            done = record.done,
            "transition"
        );
        for (role, fluents) in [
            ("state", record.state),
            ("action", record.action),
            ("info", record.info),
        ] {
            for (name, value) in fluents.iter() {
                debug!(role, fluent = name, values = %format_values(value.iter()));
            }
        }
    }

    fn on_run_end(&mut self, trajectory: &Trajectory, elapsed: Duration) {
        info!(
            run_id = %trajectory.id(),
            steps = trajectory.len(),
            total_reward = trajectory.total_reward(),
            uptime = ?elapsed,
            "run finished"
        );
    }
}

/// Formats values as `[0.100, 2.000]`.
pub(crate) fn format_values<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a f32>,
{
    let mut out = String::from("[");
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{:.3}", v);
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_three_decimals() {
        assert_eq!(format_values(&[0.1, 2.0]), "[0.100, 2.000]");
        assert_eq!(format_values(&[] as &[f32]), "[]");
    }

    #[test]
    fn default_hooks_are_noops() {
        struct Silent;
        impl RunObserver for Silent {}

        let mut observer = Silent;
        let empty = FluentMap::new();
        observer.on_run_start();
        observer.on_step(&StepRecord {
            timestep: 0,
            state: &empty,
            action: &empty,
            reward: 0.0,
            next_state: &empty,
            done: true,
            info: &empty,
            total_reward: 0.0,
        });
        observer.on_run_end(&Trajectory::new(), Duration::ZERO);
    }
}
