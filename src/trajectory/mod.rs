//! Append-only record of an episode's transitions.

pub mod frame;

pub use frame::{DataFrame, Row};

use std::ops::Index;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::{RddlError, Result};
use crate::fluent::{ColumnIndex, FluentMap};
use crate::{generate_id, Id};

/// A single recorded transition. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub step: u32,
    pub state: FluentMap,
    pub action: FluentMap,
    pub reward: f32,
    pub next_state: FluentMap,
    /// Intermediate fluent values.
    pub info: FluentMap,
    pub done: bool,
}

/// Per-fluent time series, one value per recorded step.
pub type FluentSeries = FluentMap<Vec<ArrayD<f32>>>;

/// Ordered sequence of transitions for one run.
///
/// Step monotonicity is the caller's responsibility; the trajectory records
/// whatever it is given, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    id: Id,
    transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            transitions: Vec::new(),
        }
    }

    /// Unique identifier of this run's record.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Appends one transition.
    #[allow(clippy::too_many_arguments)]
    pub fn add_transition(
        &mut self,
        step: u32,
        state: FluentMap,
        action: FluentMap,
        reward: f32,
        next_state: FluentMap,
        info: FluentMap,
        done: bool,
    ) {
        self.push(Transition {
            step,
            state,
            action,
            reward,
            next_state,
            info,
            done,
        });
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    /// Like [`Trajectory::get`], failing with [`RddlError::IndexOutOfRange`].
    pub fn transition(&self, index: usize) -> Result<&Transition> {
        self.get(index).ok_or(RddlError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn last(&self) -> Option<&Transition> {
        self.transitions.last()
    }

    /// State fluent values per step.
    pub fn states(&self) -> FluentSeries {
        self.series(|t| &t.state)
    }

    /// Action fluent values per step.
    pub fn actions(&self) -> FluentSeries {
        self.series(|t| &t.action)
    }

    /// Intermediate fluent values per step.
    pub fn infos(&self) -> FluentSeries {
        self.series(|t| &t.info)
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    /// Sum of all rewards; `0.0` for an empty trajectory.
    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }

    pub fn initial_state(&self) -> Option<&FluentMap> {
        self.transitions.first().map(|t| &t.state)
    }

    pub fn final_state(&self) -> Option<&FluentMap> {
        self.transitions.last().map(|t| &t.next_state)
    }

    /// Flattens the trajectory into a [`DataFrame`].
    ///
    /// Columns come from `columns` in its declaration order (state, action,
    /// then intermediate fluents), followed by `reward` and `done`, so an
    /// empty trajectory still carries the full header. Rows follow step
    /// order. A recorded fluent absent from `columns` is an
    /// [`RddlError::UnknownFluent`]; an indexed fluent absent from a
    /// transition is an [`RddlError::MissingFluent`].
    pub fn as_dataframe(&self, columns: &ColumnIndex) -> Result<DataFrame> {
        let names = columns.column_names();

        let rows = self
            .transitions
            .iter()
            .map(|t| {
                if let Some(unknown) = t
                    .state
                    .names()
                    .chain(t.action.names())
                    .chain(t.info.names())
                    .find(|name| columns.get(name).is_none())
                {
                    return Err(RddlError::UnknownFluent(unknown.to_string()));
                }

                let mut values = Vec::with_capacity(names.len());
                for fluent in columns.fluents() {
                    let value = t
                        .state
                        .get(fluent)
                        .or_else(|| t.action.get(fluent))
                        .or_else(|| t.info.get(fluent))
                        .ok_or_else(|| RddlError::MissingFluent(fluent.to_string()))?;
                    let expected = columns.element_names(fluent)?.len();
                    if value.len() != expected {
                        return Err(RddlError::ShapeMismatch {
                            fluent: fluent.to_string(),
                            expected: vec![expected],
                            found: vec![value.len()],
                        });
                    }
                    values.extend(value.iter().copied());
                }
                Ok(Row {
                    values,
                    reward: t.reward,
                    done: t.done,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DataFrame::new(names, rows))
    }

    fn series<F>(&self, select: F) -> FluentSeries
    where
        F: Fn(&Transition) -> &FluentMap,
    {
        let mut series = FluentSeries::new();
        for transition in &self.transitions {
            for (name, value) in select(transition).iter() {
                match series.get_mut(name) {
                    Some(values) => values.push(value.clone()),
                    None => {
                        series.insert(name, vec![value.clone()]);
                    }
                }
            }
        }
        series
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Trajectory {
    type Output = Transition;

    fn index(&self, index: usize) -> &Transition {
        &self.transitions[index]
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

impl IntoIterator for Trajectory {
    type Item = Transition;
    type IntoIter = std::vec::IntoIter<Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::{FluentDescriptor, FluentKind};
    use crate::test_utils::scalar;
    use ndarray::arr1;

    fn state(x: f32) -> FluentMap {
        [("x/0", scalar(x)), ("pos/1", arr1(&[x, -x]).into_dyn())]
            .into_iter()
            .collect()
    }

    fn action(a: f32) -> FluentMap {
        [("a/0", scalar(a))].into_iter().collect()
    }

    fn info(d: f32) -> FluentMap {
        [("d/0", scalar(d))].into_iter().collect()
    }

    fn columns() -> ColumnIndex {
        let fluents = [
            FluentDescriptor::scalar("x/0"),
            FluentDescriptor::new("pos/1", vec![2], FluentKind::Real)
                .with_objects(vec![vec!["l1".into(), "l2".into()]])
                .unwrap(),
            FluentDescriptor::scalar("a/0"),
            FluentDescriptor::scalar("d/0"),
        ];
        ColumnIndex::from_descriptors(&fluents).unwrap()
    }

    fn trajectory(len: u32) -> Trajectory {
        let mut trajectory = Trajectory::new();
        for t in 0..len {
            let x = t as f32;
            trajectory.add_transition(
                t,
                state(x),
                action(0.5),
                x * 0.5,
                state(x + 1.0),
                info(x - 1.0),
                t + 1 == len,
            );
        }
        trajectory
    }

    #[test]
    fn empty_trajectory_views() {
        let trajectory = Trajectory::new();
        assert!(trajectory.is_empty());
        assert!(trajectory.states().is_empty());
        assert!(trajectory.actions().is_empty());
        assert!(trajectory.infos().is_empty());
        assert!(trajectory.rewards().is_empty());
        assert_eq!(trajectory.total_reward(), 0.0);
        assert!(trajectory.initial_state().is_none());
        assert!(trajectory.final_state().is_none());
    }

    #[test]
    fn states_are_per_fluent_series() {
        let trajectory = trajectory(4);
        let states = trajectory.states();
        assert_eq!(states.names().collect::<Vec<_>>(), vec!["x/0", "pos/1"]);
        for (name, values) in states.iter() {
            assert_eq!(values.len(), trajectory.len());
            for (t, value) in values.iter().enumerate() {
                assert_eq!(value, &trajectory[t].state[name]);
            }
        }
    }

    #[test]
    fn actions_and_infos_are_per_fluent_series() {
        let trajectory = trajectory(3);
        assert_eq!(trajectory.actions()["a/0"].len(), 3);
        let infos = trajectory.infos();
        assert_eq!(infos["d/0"][2], scalar(1.0));
    }

    #[test]
    fn total_reward_is_sum_of_rewards() {
        let trajectory = trajectory(5);
        let rewards = trajectory.rewards();
        assert_eq!(rewards, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(trajectory.total_reward(), rewards.iter().sum::<f32>());
    }

    #[test]
    fn initial_and_final_states() {
        let trajectory = trajectory(3);
        assert_eq!(trajectory.initial_state(), Some(&state(0.0)));
        assert_eq!(
            trajectory.final_state(),
            Some(&trajectory.last().unwrap().next_state)
        );
    }

    #[test]
    fn out_of_range_access_fails() {
        let trajectory = trajectory(2);
        assert!(trajectory.transition(1).is_ok());
        assert!(matches!(
            trajectory.transition(2),
            Err(RddlError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(trajectory.get(5).is_none());
    }

    #[test]
    fn dataframe_shape() {
        let trajectory = trajectory(4);
        let df = trajectory.as_dataframe(&columns()).unwrap();
        assert_eq!(df.n_rows(), trajectory.len());
        // x + pos(l1) + pos(l2) + a + d + reward + done
        assert_eq!(df.n_columns(), 7);
        assert_eq!(
            df.columns(),
            vec!["x", "pos(l1)", "pos(l2)", "a", "d", "reward", "done"]
        );
        assert_eq!(df.column("pos(l2)").unwrap(), vec![0.0, -1.0, -2.0, -3.0]);
        assert_eq!(df.column("done").unwrap(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn dataframe_requires_known_fluents() {
        let trajectory = trajectory(2);
        let err = trajectory.as_dataframe(&ColumnIndex::default()).unwrap_err();
        assert!(matches!(err, RddlError::UnknownFluent(_)));
    }

    #[test]
    fn empty_dataframe_keeps_declared_columns() {
        let df = Trajectory::new().as_dataframe(&columns()).unwrap();
        assert_eq!(df.n_rows(), 0);
        assert_eq!(
            df.columns(),
            vec!["x", "pos(l1)", "pos(l2)", "a", "d", "reward", "done"]
        );
        assert_eq!(
            df.to_csv_string().unwrap(),
            "x,pos(l1),pos(l2),a,d,reward,done\n"
        );
    }

    #[test]
    fn dataframe_reports_missing_declared_fluent() {
        let mut index_fluents = vec![FluentDescriptor::scalar("extra/0")];
        index_fluents.extend([
            FluentDescriptor::scalar("x/0"),
            FluentDescriptor::new("pos/1", vec![2], FluentKind::Real),
            FluentDescriptor::scalar("a/0"),
            FluentDescriptor::scalar("d/0"),
        ]);
        let index = ColumnIndex::from_descriptors(&index_fluents).unwrap();
        let err = trajectory(1).as_dataframe(&index).unwrap_err();
        assert!(matches!(err, RddlError::MissingFluent(name) if name == "extra/0"));
    }

    #[test]
    fn trajectories_get_distinct_ids() {
        assert_ne!(Trajectory::new().id(), Trajectory::new().id());
    }

    #[test]
    fn serializes_to_json() {
        let trajectory = trajectory(2);
        let json = serde_json::to_string(&trajectory).unwrap();
        let back: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trajectory);
    }
}
