//! Shared fixtures for unit tests.

use ndarray::{arr0, ArrayD};

use crate::fluent::{FluentDescriptor, FluentMap};
use crate::model::{FnModel, FnModelBuilder};

pub(crate) fn scalar(value: f32) -> ArrayD<f32> {
    arr0(value).into_dyn()
}

pub(crate) fn value_of(map: &FluentMap, name: &str) -> f32 {
    map[name].iter().next().copied().unwrap_or(f32::NAN)
}

/// Two scalar state fluents `x`, `y`, one scalar action `a`, one
/// intermediate `d`.
///
/// - `d  = x - y`
/// - `x' = x + a`
/// - `y' = y + 1`
/// - `reward = y' - |x'|`
///
/// Starting from `x = 1, y = 0` with zero actions the rewards are
/// `0, 1, 2, ...`.
pub(crate) fn scenario_model(horizon: u32) -> FnModel {
    FnModelBuilder::new(horizon)
        .state(FluentDescriptor::scalar("x/0"), scalar(1.0))
        .state(FluentDescriptor::scalar("y/0"), scalar(0.0))
        .action(FluentDescriptor::scalar("a/0"))
        .interm(FluentDescriptor::scalar("d/0"))
        .cpfs(|state, action| {
            let x = value_of(state, "x/0");
            let y = value_of(state, "y/0");
            let a = value_of(action, "a/0");
            let interms: FluentMap = [("d/0", scalar(x - y))].into_iter().collect();
            let next_state: FluentMap = [("x/0", scalar(x + a)), ("y/0", scalar(y + 1.0))]
                .into_iter()
                .collect();
            Ok((interms, next_state))
        })
        .reward(|_, _, next_state| {
            Ok(value_of(next_state, "y/0") - value_of(next_state, "x/0").abs())
        })
        .build()
        .expect("scenario model is well formed")
}

/// A constant zero action for [`scenario_model`].
pub(crate) fn zero_action() -> FluentMap {
    [("a/0", scalar(0.0))].into_iter().collect()
}
