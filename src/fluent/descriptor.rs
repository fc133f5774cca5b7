//! Fluent metadata as declared by a compiled model.

use std::fmt;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::error::{RddlError, Result};

/// Numeric kind of a fluent. Both kinds are carried as `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluentKind {
    Real,
    /// Boolean fluent encoded as `0.0` / `1.0`.
    Bool,
}

impl FluentKind {
    /// Returns true if `value` is a valid encoding for this kind.
    pub fn admits(&self, value: f32) -> bool {
        match self {
            FluentKind::Real => true,
            FluentKind::Bool => value == 0.0 || value == 1.0,
        }
    }
}

impl fmt::Display for FluentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluentKind::Real => write!(f, "real"),
            FluentKind::Bool => write!(f, "bool"),
        }
    }
}

/// Immutable description of a single state, action, or intermediate fluent.
///
/// `name` is fully qualified with its arity suffix (e.g. `pos/1`), `shape`
/// lists one dimension per parameter (empty for a scalar fluent), and
/// `objects` optionally names the objects along each dimension so that
/// flattened columns read `pos(l1)` instead of `pos[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluentDescriptor {
    pub name: String,
    pub shape: Vec<usize>,
    pub kind: FluentKind,
    #[serde(default)]
    pub objects: Vec<Vec<String>>,
}

impl FluentDescriptor {
    pub fn new(name: impl Into<String>, shape: Vec<usize>, kind: FluentKind) -> Self {
        Self {
            name: name.into(),
            shape,
            kind,
            objects: Vec::new(),
        }
    }

    /// A real-valued scalar fluent.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), FluentKind::Real)
    }

    /// Attaches per-dimension object names.
    ///
    /// Fails with [`RddlError::Configuration`] unless there is one list per
    /// dimension and each list matches that dimension's size.
    pub fn with_objects(mut self, objects: Vec<Vec<String>>) -> Result<Self> {
        self.objects = objects;
        self.validate()?;
        Ok(self)
    }

    /// Checks that `objects` is either empty or names every element of
    /// every dimension.
    pub fn validate(&self) -> Result<()> {
        let consistent = self.objects.is_empty()
            || (self.objects.len() == self.shape.len()
                && self
                    .objects
                    .iter()
                    .zip(&self.shape)
                    .all(|(names, dim)| names.len() == *dim));
        if consistent {
            Ok(())
        } else {
            Err(RddlError::Configuration(format!(
                "object names for '{}' do not match shape {:?}",
                self.name, self.shape
            )))
        }
    }

    /// Name without the `/arity` suffix.
    pub fn base_name(&self) -> &str {
        match self.name.find('/') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }

    /// Number of scalar elements (1 for a scalar fluent).
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// A zero-filled array of this fluent's shape.
    pub fn zeros(&self) -> ArrayD<f32> {
        ArrayD::zeros(IxDyn(&self.shape))
    }

    /// Column names for every element, in row-major order.
    pub fn element_names(&self) -> Vec<String> {
        let base = self.base_name();
        if self.shape.is_empty() {
            return vec![base.to_string()];
        }

        let mut names = Vec::with_capacity(self.size());
        let mut index = vec![0usize; self.shape.len()];
        for _ in 0..self.size() {
            let args: Vec<String> = if self.objects.is_empty() {
                index.iter().map(|i| i.to_string()).collect()
            } else {
                index
                    .iter()
                    .enumerate()
                    .map(|(dim, i)| {
                        self.objects
                            .get(dim)
                            .and_then(|names| names.get(*i))
                            .cloned()
                            .unwrap_or_else(|| i.to_string())
                    })
                    .collect()
            };
            if self.objects.is_empty() {
                names.push(format!("{}[{}]", base, args.join(",")));
            } else {
                names.push(format!("{}({})", base, args.join(",")));
            }

            // Row-major increment.
            for dim in (0..index.len()).rev() {
                index[dim] += 1;
                if index[dim] < self.shape[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
        names
    }

    /// Checks that `value` has this fluent's shape and admissible values.
    pub fn check(&self, value: &ArrayD<f32>) -> Result<()> {
        if value.shape() != self.shape.as_slice() {
            return Err(RddlError::ShapeMismatch {
                fluent: self.name.clone(),
                expected: self.shape.clone(),
                found: value.shape().to_vec(),
            });
        }
        if !value.iter().all(|v| self.kind.admits(*v)) {
            return Err(RddlError::KindMismatch {
                fluent: self.name.clone(),
                kind: self.kind,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn base_name_strips_arity() {
        assert_eq!(FluentDescriptor::scalar("x/0").base_name(), "x");
        assert_eq!(FluentDescriptor::scalar("x").base_name(), "x");
    }

    #[test]
    fn scalar_has_single_element() {
        let d = FluentDescriptor::scalar("rlevel/0");
        assert_eq!(d.size(), 1);
        assert_eq!(d.element_names(), vec!["rlevel"]);
    }

    #[test]
    fn element_names_use_indices_without_objects() {
        let d = FluentDescriptor::new("pos/2", vec![2, 2], FluentKind::Real);
        assert_eq!(
            d.element_names(),
            vec!["pos[0,0]", "pos[0,1]", "pos[1,0]", "pos[1,1]"]
        );
    }

    #[test]
    fn element_names_use_objects() {
        let d = FluentDescriptor::new("rlevel/1", vec![2], FluentKind::Real)
            .with_objects(vec![vec!["t1".into(), "t2".into()]])
            .unwrap();
        assert_eq!(d.element_names(), vec!["rlevel(t1)", "rlevel(t2)"]);
    }

    #[test]
    fn with_objects_rejects_wrong_count() {
        let d = FluentDescriptor::new("rlevel/1", vec![3], FluentKind::Real);
        let err = d.with_objects(vec![vec!["t1".into()]]).unwrap_err();
        assert!(matches!(err, RddlError::Configuration(_)));
    }

    #[test]
    fn deserialized_objects_are_validated() {
        let json = r#"{"name":"pos/1","shape":[2],"kind":"real","objects":[["l1"]]}"#;
        let d: FluentDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(d.validate(), Err(RddlError::Configuration(_))));
        // Naming never indexes past the supplied objects.
        assert_eq!(d.element_names(), vec!["pos(l1)", "pos(1)"]);
        assert!(FluentDescriptor::scalar("x/0").validate().is_ok());
    }

    #[test]
    fn check_rejects_wrong_shape() {
        let d = FluentDescriptor::new("move/1", vec![2], FluentKind::Real);
        let err = d.check(&arr1(&[1.0, 2.0, 3.0]).into_dyn()).unwrap_err();
        assert!(matches!(err, RddlError::ShapeMismatch { .. }));
    }

    #[test]
    fn check_rejects_non_boolean_values() {
        let d = FluentDescriptor::new("open/1", vec![2], FluentKind::Bool);
        assert!(d.check(&arr1(&[0.0, 1.0]).into_dyn()).is_ok());
        let err = d.check(&arr1(&[0.5, 1.0]).into_dyn()).unwrap_err();
        assert!(matches!(err, RddlError::KindMismatch { .. }));
    }
}
