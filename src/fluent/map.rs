//! Ordered fluent-name mappings.

use std::ops::Index;

use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};

use super::descriptor::FluentDescriptor;
use crate::error::{RddlError, Result};

/// Mapping from fluent name to value that preserves insertion order.
///
/// States, actions, and infos use the default `ArrayD<f32>` value type; the
/// trajectory reuses the container with `Vec<ArrayD<f32>>` values for
/// per-fluent time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluentMap<V = ArrayD<f32>> {
    entries: Vec<(String, V)>,
}

impl<V> FluentMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a value. An existing entry keeps its position and the old
    /// value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FluentMap {
    /// Adds a leading batch axis of size 1 to every array.
    pub fn batched(&self) -> FluentMap {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone().insert_axis(Axis(0))))
            .collect()
    }

    /// Size of the leading batch axis shared by every array.
    pub fn batch_size(&self) -> Result<usize> {
        let mut size = None;
        for (name, value) in self.iter() {
            let n = *value.shape().first().ok_or_else(|| {
                RddlError::Model(format!("fluent '{}' has no batch axis", name))
            })?;
            match size {
                None => size = Some(n),
                Some(m) if m != n => {
                    return Err(RddlError::Model(format!(
                        "inconsistent batch sizes: {} and {} ('{}')",
                        m, n, name
                    )))
                }
                _ => {}
            }
        }
        Ok(size.unwrap_or(0))
    }

    /// Extracts entry `index` along the leading batch axis of every array.
    pub fn unbatch(&self, index: usize) -> Result<FluentMap> {
        self.iter()
            .map(|(name, value)| {
                let batch = value.shape().first().copied().unwrap_or(0);
                if index >= batch {
                    return Err(RddlError::Model(format!(
                        "batch index {} out of range for fluent '{}'",
                        index, name
                    )));
                }
                Ok((name.to_string(), value.index_axis(Axis(0), index).to_owned()))
            })
            .collect()
    }

    /// Stacks unbatched maps into one batched map, ordered by `fluents`.
    pub fn stack(maps: &[FluentMap], fluents: &[FluentDescriptor]) -> Result<FluentMap> {
        let mut stacked = FluentMap::with_capacity(fluents.len());
        for fluent in fluents {
            let views = maps
                .iter()
                .map(|m| {
                    m.get(&fluent.name)
                        .map(|v| v.view())
                        .ok_or_else(|| RddlError::MissingFluent(fluent.name.clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            let array = ndarray::stack(Axis(0), &views).map_err(|e| {
                RddlError::Model(format!("cannot stack '{}': {}", fluent.name, e))
            })?;
            stacked.insert(fluent.name.clone(), array);
        }
        Ok(stacked)
    }

    /// Checks this map against `fluents`: same names, declared shapes and kinds.
    pub fn conform(&self, fluents: &[FluentDescriptor]) -> Result<()> {
        for fluent in fluents {
            let value = self
                .get(&fluent.name)
                .ok_or_else(|| RddlError::MissingFluent(fluent.name.clone()))?;
            fluent.check(value)?;
        }
        if let Some(extra) = self
            .names()
            .find(|name| !fluents.iter().any(|f| f.name == *name))
        {
            return Err(RddlError::UnknownFluent(extra.to_string()));
        }
        Ok(())
    }

    /// Returns a copy with entries reordered to the declaration order of `fluents`.
    pub fn ordered(&self, fluents: &[FluentDescriptor]) -> Result<FluentMap> {
        fluents
            .iter()
            .map(|f| {
                self.get(&f.name)
                    .map(|v| (f.name.clone(), v.clone()))
                    .ok_or_else(|| RddlError::MissingFluent(f.name.clone()))
            })
            .collect()
    }
}

impl<V> Default for FluentMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FluentMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FluentMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V> IntoIterator for FluentMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V> Index<&str> for FluentMap<V> {
    type Output = V;

    fn index(&self, name: &str) -> &V {
        self.get(name)
            .unwrap_or_else(|| panic!("no fluent named '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent::FluentKind;
    use ndarray::{arr0, arr1};

    fn sample_map() -> FluentMap {
        let mut map = FluentMap::new();
        map.insert("b/0", arr0(1.0).into_dyn());
        map.insert("a/1", arr1(&[1.0, 2.0]).into_dyn());
        map
    }

    #[test]
    fn preserves_insertion_order() {
        let map = sample_map();
        let names: Vec<_> = map.names().collect();
        assert_eq!(names, vec!["b/0", "a/1"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = sample_map();
        let old = map.insert("b/0", arr0(5.0).into_dyn());
        assert_eq!(old, Some(arr0(1.0).into_dyn()));
        assert_eq!(map.len(), 2);
        assert_eq!(map.names().next(), Some("b/0"));
        assert_eq!(map["b/0"], arr0(5.0).into_dyn());
    }

    #[test]
    fn batch_round_trip() {
        let map = sample_map();
        let batched = map.batched();
        assert_eq!(batched["a/1"].shape(), &[1, 2]);
        assert_eq!(batched.batch_size().unwrap(), 1);
        assert_eq!(batched.unbatch(0).unwrap(), map);
    }

    #[test]
    fn unbatch_out_of_range_fails() {
        let batched = sample_map().batched();
        assert!(matches!(batched.unbatch(1), Err(RddlError::Model(_))));
    }

    #[test]
    fn stack_orders_by_declaration() {
        let fluents = vec![
            FluentDescriptor::new("a/1", vec![2], FluentKind::Real),
            FluentDescriptor::scalar("b/0"),
        ];
        let stacked = FluentMap::stack(&[sample_map(), sample_map()], &fluents).unwrap();
        assert_eq!(stacked.names().collect::<Vec<_>>(), vec!["a/1", "b/0"]);
        assert_eq!(stacked["a/1"].shape(), &[2, 2]);
        assert_eq!(stacked["b/0"].shape(), &[2]);
    }

    #[test]
    fn conform_reports_missing_and_unknown() {
        let fluents = vec![FluentDescriptor::scalar("b/0")];
        let err = sample_map().conform(&fluents).unwrap_err();
        assert!(matches!(err, RddlError::UnknownFluent(name) if name == "a/1"));

        let fluents = vec![FluentDescriptor::scalar("c/0")];
        let err = sample_map().conform(&fluents).unwrap_err();
        assert!(matches!(err, RddlError::MissingFluent(name) if name == "c/0"));
    }
}
