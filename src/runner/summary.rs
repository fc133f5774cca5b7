//! Aggregate statistics over repeated runs.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{RddlError, Result};

/// Total-reward statistics over several runs of the same planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub n_runs: usize,
    pub mean_total_reward: f64,
    /// Population standard deviation.
    pub std_total_reward: f64,
    pub min_total_reward: f64,
    pub max_total_reward: f64,
    pub mean_elapsed: Duration,
}

impl RunSummary {
    /// Aggregates `(total_reward, elapsed)` pairs, one per run.
    pub fn from_runs(runs: &[(f32, Duration)]) -> Result<Self> {
        if runs.is_empty() {
            return Err(RddlError::Configuration(
                "cannot summarize zero runs".into(),
            ));
        }

        let n = runs.len() as f64;
        let totals: Vec<f64> = runs.iter().map(|(r, _)| *r as f64).collect();
        let mean = totals.iter().sum::<f64>() / n;
        let var = totals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let elapsed: Duration = runs.iter().map(|(_, e)| *e).sum();

        Ok(Self {
            n_runs: runs.len(),
            mean_total_reward: mean,
            std_total_reward: var.sqrt(),
            min_total_reward: min,
            max_total_reward: max,
            mean_elapsed: elapsed.div_f64(n),
        })
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Summary ({} runs) ===", self.n_runs)?;
        writeln!(
            f,
            "  Total reward:  {:.3} ± {:.3}",
            self.mean_total_reward, self.std_total_reward
        )?;
        writeln!(
            f,
            "  Range:         [{:.3}, {:.3}]",
            self.min_total_reward, self.max_total_reward
        )?;
        writeln!(f, "  Mean uptime:   {:?}", self.mean_elapsed)
    }
}
